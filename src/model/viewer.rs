use std::collections::BTreeSet;

use super::{Atlas, Coordinates};

/// Read-only rendering input for one district under the selected era.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictView<'a> {
    pub province_id: &'a str,
    pub district_id: &'a str,
    pub name: &'a str,
    pub coordinates: Coordinates,
    pub fill: &'a str,
}

impl Atlas {
    /// Every district in province order, colored for `era`.
    pub fn era_view(&self, era: Option<&str>) -> Vec<DistrictView<'_>> {
        self.provinces()
            .iter()
            .flat_map(|province| {
                self.districts(&province.id)
                    .iter()
                    .map(move |district| DistrictView {
                        province_id: province.id.as_str(),
                        district_id: district.id.as_str(),
                        name: district.name.as_str(),
                        coordinates: district.coordinates,
                        fill: district.fill_for(era),
                    })
            })
            .collect()
    }

    /// Sorted set of eras defined anywhere on the map.
    pub fn eras(&self) -> Vec<String> {
        self.provinces()
            .iter()
            .flat_map(|province| self.districts(&province.id))
            .flat_map(|district| district.historical_periods.iter())
            .map(|period| period.era.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
