use serde::{Deserialize, Serialize};

/// Radial / along-track / cross-track offset from the formation reference,
/// in kilometers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RtnOffset {
    pub radial_km: f64,
    pub along_track_km: f64,
    pub cross_track_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub id: String,
    pub offset: RtnOffset,
    /// Optional orbit-plane label used by the plane-intersection check.
    pub plane: Option<String>,
}

impl VehicleSpec {
    pub fn new(id: impl Into<String>, offset: RtnOffset) -> Self {
        VehicleSpec {
            id: id.into(),
            offset,
            plane: None,
        }
    }

    pub fn with_plane(mut self, plane: impl Into<String>) -> Self {
        self.plane = Some(plane.into());
        self
    }
}

/// Per-run formation description. The plane-label-to-vehicle mapping lives
/// here rather than in any global table, so concurrent runs with different
/// formations cannot interfere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationConfig {
    pub vehicles: Vec<VehicleSpec>,
}

impl FormationConfig {
    pub fn new(vehicles: Vec<VehicleSpec>) -> Self {
        FormationConfig { vehicles }
    }

    /// Vehicle indices grouped by plane label, sorted by label for a
    /// deterministic ordering. Vehicles without a label belong to no group.
    pub fn plane_groups(&self) -> Vec<(String, Vec<usize>)> {
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (index, vehicle) in self.vehicles.iter().enumerate() {
            let Some(label) = &vehicle.plane else {
                continue;
            };
            match groups.iter_mut().find(|(name, _)| name == label) {
                Some((_, members)) => members.push(index),
                None => groups.push((label.clone(), vec![index])),
            }
        }
        groups.sort_by(|(a, _), (b, _)| a.cmp(b));
        groups
    }
}

/// Fixed surface target the compliance evaluator measures against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_groups_are_sorted_and_complete() {
        let formation = FormationConfig::new(vec![
            VehicleSpec::new("b1", RtnOffset::default()).with_plane("beta"),
            VehicleSpec::new("a1", RtnOffset::default()).with_plane("alpha"),
            VehicleSpec::new("free", RtnOffset::default()),
            VehicleSpec::new("a2", RtnOffset::default()).with_plane("alpha"),
        ]);
        let groups = formation.plane_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], ("alpha".to_string(), vec![1, 3]));
        assert_eq!(groups[1], ("beta".to_string(), vec![0]));
    }
}
