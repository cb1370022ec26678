//! Catalog of purchasable pipe objects and their external diameters.
//!
//! The catalog owns every object in an arena; the rest of the crate refers to
//! objects through copyable [`PipeRef`] handles. Objects form a closed set of
//! six kinds modeled as one tagged enum over a common header.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::csv::{self, CsvFile};
use crate::error::{Error, Result};

/// Handle to one catalog object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipeRef(usize);

/// How a reduction's narrow end sits against the wide end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReductionAlignment {
    Center,
    Edge,
}

/// Handedness of a cross fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossKind {
    Plain,
    Left,
    Right,
}

/// Variant data of one catalog object. Diameters and angles in mm/degrees,
/// lengths in mm.
#[derive(Debug, Clone, PartialEq)]
pub enum PipeKind {
    /// Straight pipe, priced per mm.
    Direct { diameter: u32 },
    /// Fan (vent) pipe, priced per mm.
    Fan { diameter: u32 },
    /// Diameter reduction, female side wider than male side.
    Reduction {
        f_diameter: u32,
        m_diameter: u32,
        length: f64,
        alignment: ReductionAlignment,
    },
    /// Bend with one inlet and one outlet.
    Angle {
        diameter: u32,
        angle_deg: u32,
        f_length: f64,
        m_length: f64,
    },
    /// Straight run with one extra inlet.
    Tee {
        base_diameter: u32,
        extra_diameter: u32,
        angle_deg: u32,
        f_length: f64,
        base_m_length: f64,
        extra_m_length: f64,
    },
    /// Straight run with two extra inlets.
    Cross {
        base_diameter: u32,
        second_diameter: u32,
        third_diameter: u32,
        kind: CrossKind,
        angle_deg: u32,
        f_length: f64,
        base_m_length: f64,
        second_m_length: f64,
        third_m_length: f64,
    },
}

/// One catalog object: common header plus variant data.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeObject {
    pub id: i64,
    pub name: String,
    /// Cost per mm for direct/fan pipes, per piece for fittings.
    pub cost: f64,
    pub kind: PipeKind,
}

/// The loaded catalog: objects plus lookup tables.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    objects: Vec<PipeObject>,
    /// Available diameters, ascending.
    diameters: Vec<u32>,
    external_diameter_for: BTreeMap<u32, u32>,
    direct_for_diameter: BTreeMap<u32, PipeRef>,
    fan_for_diameter: BTreeMap<u32, PipeRef>,
    /// Reductions per female diameter, ascending male diameter.
    reductions_for_f_diameter: BTreeMap<u32, Vec<PipeRef>>,
    /// Angles per diameter, ascending angle.
    angles_for_diameter: BTreeMap<u32, Vec<PipeRef>>,
    /// Tees per base diameter, ascending extra diameter.
    tees_for_base_diameter: BTreeMap<u32, Vec<PipeRef>>,
    /// Crosses per base diameter, ascending second diameter.
    crosses_for_base_diameter: BTreeMap<u32, Vec<PipeRef>>,
}

impl Catalog {
    /// Load external diameters and materials from their CSV files.
    pub fn load_from_files(external_diameters: &Path, materials: &Path) -> Result<Self> {
        Self::load(
            &csv::load(external_diameters, "externalDiameters.csv")?,
            &csv::load(materials, "materials.csv")?,
        )
    }

    /// Load a catalog from already-read CSV contents.
    pub fn load(external_diameters: &CsvFile, materials: &CsvFile) -> Result<Self> {
        let mut catalog = Catalog::default();
        catalog.load_external_diameters(external_diameters)?;
        catalog.load_materials(materials)?;
        catalog.check_external_diameters()?;
        Ok(catalog)
    }

    /// The object behind a handle.
    pub fn object(&self, pipe: PipeRef) -> &PipeObject {
        &self.objects[pipe.0]
    }

    /// Available diameters, ascending.
    pub fn diameters(&self) -> &[u32] {
        &self.diameters
    }

    /// Outer-wall diameter for a connection diameter.
    ///
    /// Every diameter used by any source, destination, or catalog object must
    /// be listed in the external-diameters file.
    pub fn external_diameter(&self, diameter: u32) -> Result<u32> {
        self.external_diameter_for
            .get(&diameter)
            .copied()
            .ok_or_else(|| {
                Error::Validation(format!(
                    "no external diameter is listed for the used diameter {diameter}"
                ))
            })
    }

    /// Half the external diameter: the clearance radius of a laid pipe.
    pub fn external_radius(&self, diameter: u32) -> Result<f64> {
        Ok(f64::from(self.external_diameter(diameter)?) / 2.0)
    }

    /// The straight pipe of the given diameter.
    pub fn direct_pipe(&self, diameter: u32) -> Result<PipeRef> {
        self.direct_for_diameter
            .get(&diameter)
            .copied()
            .ok_or_else(|| {
                Error::Validation(format!(
                    "the catalog offers no straight pipe of diameter {diameter}"
                ))
            })
    }

    /// The fan pipe of the given diameter, if available.
    pub fn fan_pipe(&self, diameter: u32) -> Option<PipeRef> {
        self.fan_for_diameter.get(&diameter).copied()
    }

    /// Reductions with the given female diameter, ascending male diameter.
    pub fn reductions(&self, f_diameter: u32) -> &[PipeRef] {
        self.reductions_for_f_diameter
            .get(&f_diameter)
            .map_or(&[], Vec::as_slice)
    }

    /// Angle fittings of the given diameter, ascending angle.
    pub fn angles(&self, diameter: u32) -> &[PipeRef] {
        self.angles_for_diameter
            .get(&diameter)
            .map_or(&[], Vec::as_slice)
    }

    /// Tees with the given base diameter, ascending extra diameter.
    pub fn tees(&self, base_diameter: u32) -> &[PipeRef] {
        self.tees_for_base_diameter
            .get(&base_diameter)
            .map_or(&[], Vec::as_slice)
    }

    /// Crosses with the given base diameter, ascending second diameter.
    pub fn crosses(&self, base_diameter: u32) -> &[PipeRef] {
        self.crosses_for_base_diameter
            .get(&base_diameter)
            .map_or(&[], Vec::as_slice)
    }

    fn load_external_diameters(&mut self, file: &CsvFile) -> Result<()> {
        for mut row in file.rows() {
            let diameter: u32 = row.parse("diameter")?;
            let external: u32 = row.parse("externalDiameter")?;
            if external < diameter {
                return Err(row.error(
                    "externalDiameter",
                    "the external diameter cannot be smaller than the diameter",
                ));
            }
            self.external_diameter_for.insert(diameter, external);
        }
        Ok(())
    }

    fn load_materials(&mut self, file: &CsvFile) -> Result<()> {
        let mut diameters: BTreeSet<u32> = BTreeSet::new();

        for mut row in file.rows() {
            let kind_token = row.field("type").to_ascii_lowercase();
            let id: i64 = row.parse("id")?;
            let name = row.field("name").to_string();

            let d1: u32 = row.parse("d1")?;
            if d1 == 0 {
                return Err(row.error("d1", "diameter 1 must be positive"));
            }
            let d2_text = row.field("d2").to_string();
            let d3_text = row.field("d3").to_string();
            let angle_text = row.field("angle").to_string();
            let l1_text = row.field("L1").to_string();
            let l2_text = row.field("L2").to_string();
            let l3_text = row.field("L3").to_string();
            let l4_text = row.field("L4").to_string();
            let cross_type_token = row.field("crossType").to_ascii_lowercase();
            let alignment_token = row.field("reductionAlignment").to_ascii_lowercase();
            let cost: f64 = row.parse("cost")?;

            let parse_u32 = |text: &str, column: &str, row: &csv::Row<'_>| -> Result<u32> {
                text.parse().map_err(|_| {
                    row.error(
                        column,
                        if text.is_empty() {
                            "field is missing".to_string()
                        } else {
                            format!("cannot parse \"{text}\"")
                        },
                    )
                })
            };
            let parse_length = |text: &str, column: &str, row: &csv::Row<'_>| -> Result<f64> {
                let value = parse_u32(text, column, row)?;
                if value == 0 {
                    return Err(row.error(column, "the length must be positive"));
                }
                Ok(f64::from(value))
            };
            let parse_angle = |text: &str, row: &csv::Row<'_>| -> Result<u32> {
                let value = parse_u32(text, "angle", row)?;
                if !(1..=90).contains(&value) {
                    return Err(row.error("angle", "the angle must lie in [1, 90] degrees"));
                }
                Ok(value)
            };

            let kind = match kind_token.as_str() {
                "pipe" => {
                    diameters.insert(d1);
                    PipeKind::Direct { diameter: d1 }
                }
                "fan pipe" => {
                    diameters.insert(d1);
                    PipeKind::Fan { diameter: d1 }
                }
                "reduction" => {
                    let d2 = parse_u32(&d2_text, "d2", &row)?;
                    if d2 == 0 {
                        return Err(row.error("d2", "diameter 2 must be positive"));
                    }
                    if d2 >= d1 {
                        return Err(row.error(
                            "d2",
                            "a reduction's diameter 2 must be smaller than its diameter 1",
                        ));
                    }
                    let alignment = match alignment_token.as_str() {
                        "center" => ReductionAlignment::Center,
                        "edge" => ReductionAlignment::Edge,
                        other => {
                            return Err(row.error(
                                "reductionAlignment",
                                format!("unknown alignment \"{other}\" (expected center or edge)"),
                            ));
                        }
                    };
                    diameters.insert(d1);
                    diameters.insert(d2);
                    PipeKind::Reduction {
                        f_diameter: d1,
                        m_diameter: d2,
                        length: parse_length(&l1_text, "L1", &row)?,
                        alignment,
                    }
                }
                "angle" => {
                    diameters.insert(d1);
                    PipeKind::Angle {
                        diameter: d1,
                        angle_deg: parse_angle(&angle_text, &row)?,
                        f_length: parse_length(&l1_text, "L1", &row)?,
                        m_length: parse_length(&l2_text, "L2", &row)?,
                    }
                }
                "tee" => {
                    let d2 = parse_u32(&d2_text, "d2", &row)?;
                    if d2 == 0 {
                        return Err(row.error("d2", "diameter 2 must be positive"));
                    }
                    if d2 > d1 {
                        return Err(row.error(
                            "d2",
                            "a tee's diameter 2 must not exceed its diameter 1",
                        ));
                    }
                    diameters.insert(d1);
                    diameters.insert(d2);
                    PipeKind::Tee {
                        base_diameter: d1,
                        extra_diameter: d2,
                        angle_deg: parse_angle(&angle_text, &row)?,
                        f_length: parse_length(&l1_text, "L1", &row)?,
                        base_m_length: parse_length(&l2_text, "L2", &row)?,
                        extra_m_length: parse_length(&l3_text, "L3", &row)?,
                    }
                }
                "cross" => {
                    let d2 = parse_u32(&d2_text, "d2", &row)?;
                    let d3 = parse_u32(&d3_text, "d3", &row)?;
                    if d2 == 0 || d3 == 0 {
                        return Err(row.error("d2", "cross diameters must be positive"));
                    }
                    if d2 > d1 {
                        return Err(row.error(
                            "d2",
                            "a cross's diameter 2 must not exceed its diameter 1",
                        ));
                    }
                    let cross_kind = match cross_type_token.as_str() {
                        "" => CrossKind::Plain,
                        "left" => CrossKind::Left,
                        "right" => CrossKind::Right,
                        other => {
                            return Err(row.error(
                                "crossType",
                                format!("unknown cross type \"{other}\""),
                            ));
                        }
                    };
                    diameters.insert(d1);
                    diameters.insert(d2);
                    diameters.insert(d3);
                    PipeKind::Cross {
                        base_diameter: d1,
                        second_diameter: d2,
                        third_diameter: d3,
                        kind: cross_kind,
                        angle_deg: parse_angle(&angle_text, &row)?,
                        f_length: parse_length(&l1_text, "L1", &row)?,
                        base_m_length: parse_length(&l2_text, "L2", &row)?,
                        second_m_length: parse_length(&l3_text, "L3", &row)?,
                        third_m_length: parse_length(&l4_text, "L4", &row)?,
                    }
                }
                other => {
                    return Err(row.error(
                        "type",
                        format!(
                            "unknown object type \"{other}\" (expected pipe, fan pipe, \
                             reduction, angle, tee, or cross)"
                        ),
                    ));
                }
            };

            self.insert(PipeObject {
                id,
                name,
                cost,
                kind,
            });
        }

        self.diameters = diameters.into_iter().collect();
        self.sort_lookup_tables();
        Ok(())
    }

    fn insert(&mut self, object: PipeObject) {
        let pipe = PipeRef(self.objects.len());
        match &object.kind {
            PipeKind::Direct { diameter } => {
                self.direct_for_diameter.insert(*diameter, pipe);
            }
            PipeKind::Fan { diameter } => {
                self.fan_for_diameter.insert(*diameter, pipe);
            }
            PipeKind::Reduction { f_diameter, .. } => {
                self.reductions_for_f_diameter
                    .entry(*f_diameter)
                    .or_default()
                    .push(pipe);
            }
            PipeKind::Angle { diameter, .. } => {
                self.angles_for_diameter
                    .entry(*diameter)
                    .or_default()
                    .push(pipe);
            }
            PipeKind::Tee { base_diameter, .. } => {
                self.tees_for_base_diameter
                    .entry(*base_diameter)
                    .or_default()
                    .push(pipe);
            }
            PipeKind::Cross { base_diameter, .. } => {
                self.crosses_for_base_diameter
                    .entry(*base_diameter)
                    .or_default()
                    .push(pipe);
            }
        }
        self.objects.push(object);
    }

    fn sort_lookup_tables(&mut self) {
        let objects = &self.objects;
        for refs in self.reductions_for_f_diameter.values_mut() {
            refs.sort_by_key(|r| match &objects[r.0].kind {
                PipeKind::Reduction { m_diameter, .. } => *m_diameter,
                _ => u32::MAX,
            });
        }
        for refs in self.angles_for_diameter.values_mut() {
            refs.sort_by_key(|r| match &objects[r.0].kind {
                PipeKind::Angle { angle_deg, .. } => *angle_deg,
                _ => u32::MAX,
            });
        }
        for refs in self.tees_for_base_diameter.values_mut() {
            refs.sort_by_key(|r| match &objects[r.0].kind {
                PipeKind::Tee { extra_diameter, .. } => *extra_diameter,
                _ => u32::MAX,
            });
        }
        for refs in self.crosses_for_base_diameter.values_mut() {
            refs.sort_by_key(|r| match &objects[r.0].kind {
                PipeKind::Cross {
                    second_diameter, ..
                } => *second_diameter,
                _ => u32::MAX,
            });
        }
    }

    fn check_external_diameters(&self) -> Result<()> {
        for diameter in &self.diameters {
            if !self.external_diameter_for.contains_key(diameter) {
                return Err(Error::Validation(format!(
                    "the external-diameters file lists no entry for diameter {diameter}, \
                     which the materials file uses"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv;

    const EXTERNALS: &str = "diameter;externalDiameter\n40;46\n50;60\n100;120\n";

    fn materials(rows: &str) -> CsvFile {
        csv::from_str(
            &format!(
                "type;id;name;d1;d2;d3;angle;L1;L2;L3;L4;crossType;reductionAlignment;cost\n{rows}"
            ),
            "materials.csv",
        )
    }

    fn load(rows: &str) -> Result<Catalog> {
        Catalog::load(
            &csv::from_str(EXTERNALS, "externalDiameters.csv"),
            &materials(rows),
        )
    }

    #[test]
    fn loads_direct_pipes_and_diameters() {
        let catalog = load(
            "pipe;1;PP 50;50;;;;;;;;;;0.4\n\
             Pipe;2;PP 100;100;;;;;;;;;;0.9\n",
        )
        .unwrap();
        assert_eq!(catalog.diameters(), &[50, 100]);
        let pipe = catalog.direct_pipe(50).unwrap();
        assert_eq!(catalog.object(pipe).name, "PP 50");
        assert_eq!(catalog.object(pipe).cost, 0.4);
        assert!(catalog.direct_pipe(40).is_err());
    }

    #[test]
    fn external_diameter_lookup() {
        let catalog = load("pipe;1;PP 50;50;;;;;;;;;;0.4\n").unwrap();
        assert_eq!(catalog.external_diameter(50).unwrap(), 60);
        assert_eq!(catalog.external_radius(50).unwrap(), 30.0);
        assert!(catalog.external_diameter(75).is_err());
    }

    #[test]
    fn rejects_external_smaller_than_diameter() {
        let result = Catalog::load(
            &csv::from_str("d;ed\n50;40\n", "externalDiameters.csv"),
            &materials(""),
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_used_diameter_without_external() {
        let result = Catalog::load(
            &csv::from_str("d;ed\n50;60\n", "externalDiameters.csv"),
            &materials("pipe;1;PP 100;100;;;;;;;;;;0.9\n"),
        );
        assert!(result.unwrap_err().to_string().contains("100"));
    }

    #[test]
    fn loads_fittings_sorted() {
        let catalog = load(
            "angle;10;bend 87;50;;;87;30;25;;;;;200\n\
             angle;11;bend 45;50;;;45;28;22;;;;;180\n\
             tee;20;tee 50/40;50;40;;45;60;40;35;;;;350\n\
             reduction;30;red 100/50;100;50;;;80;;;;;center;150\n\
             cross;40;cross;100;50;50;45;90;60;50;50;left;;700\n\
             fan pipe;50;fan 50;50;;;;;;;;;;0.5\n",
        )
        .unwrap();

        let angles = catalog.angles(50);
        assert_eq!(angles.len(), 2);
        assert!(matches!(
            catalog.object(angles[0]).kind,
            PipeKind::Angle { angle_deg: 45, .. }
        ));
        assert!(matches!(
            catalog.object(angles[1]).kind,
            PipeKind::Angle { angle_deg: 87, .. }
        ));

        assert_eq!(catalog.tees(50).len(), 1);
        assert_eq!(catalog.reductions(100).len(), 1);
        assert_eq!(catalog.crosses(100).len(), 1);
        assert!(catalog.fan_pipe(50).is_some());
        assert!(catalog.fan_pipe(100).is_none());
        // 40 enters through the tee's extra inlet.
        assert_eq!(catalog.diameters(), &[40, 50, 100]);
    }

    #[test]
    fn rejects_reduction_not_narrowing() {
        assert!(load("reduction;1;bad;50;50;;;80;;;;;center;150\n").is_err());
        assert!(load("reduction;1;bad;50;100;;;80;;;;;center;150\n").is_err());
    }

    #[test]
    fn rejects_angle_out_of_range() {
        assert!(load("angle;1;bad;50;;;0;30;25;;;;;200\n").is_err());
        assert!(load("angle;1;bad;50;;;91;30;25;;;;;200\n").is_err());
    }

    #[test]
    fn rejects_unknown_type() {
        let err = load("elbow;1;bad;50;;;;;;;;;;10\n").unwrap_err();
        assert!(err.to_string().contains("elbow"));
    }

    #[test]
    fn rejects_unknown_cross_type() {
        assert!(load("cross;1;bad;100;50;50;45;90;60;50;50;upward;;700\n").is_err());
    }
}
