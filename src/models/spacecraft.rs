/// Physical properties the drag model needs from a vehicle.
pub trait SpacecraftProperties {
    fn mass(&self) -> f64;
    fn drag_coefficient(&self) -> f64;
    fn reference_area(&self) -> f64;

    /// Drag area-to-mass ratio (m²/kg).
    fn ballistic_coefficient(&self) -> f64 {
        self.reference_area() / self.mass()
    }
}
