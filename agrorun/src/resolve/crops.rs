//! The static crop-code to module table.

use crate::workspace::is_experiment;
use std::path::Path;

/// Two-letter crop codes and the module each one runs.
pub const CROP_MODULES: &[(&str, &str)] = &[
    ("MZ", "MZCER048"),
    ("SW", "SWCER048"),
    ("WH", "WHCER048"),
    ("BA", "BACER048"),
    ("RI", "RICER048"),
    ("SG", "SGCER048"),
    ("ML", "MLCER048"),
    ("SB", "SBGRO048"),
    ("PN", "PNGRO048"),
    ("BN", "BNGRO048"),
    ("CP", "CPGRO048"),
    ("CH", "CHGRO048"),
    ("FB", "FBGRO048"),
    ("PP", "PPGRO048"),
    ("TM", "TMGRO048"),
    ("PR", "PRGRO048"),
    ("CB", "CBGRO048"),
    ("PT", "PTSUB048"),
    ("CS", "CSCAS048"),
    ("SC", "SCCAN048"),
    ("SU", "SUOIL048"),
    ("AL", "ALFRM048"),
];

/// Looks up the module for a crop code, case-insensitively.
#[must_use]
pub fn module_for_crop(crop: &str) -> Option<&'static str> {
    CROP_MODULES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(crop))
        .map(|(_, module)| *module)
}

/// Returns the crop code embedded in an experiment file extension
/// (`UFGA8201.MZX` gives `MZ`).
#[must_use]
pub fn crop_from_extension(name: &str) -> Option<String> {
    if !is_experiment(name) {
        return None;
    }
    let ext = Path::new(name).extension()?.to_str()?;
    Some(ext.chars().take(2).collect::<String>().to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_crop_maps_to_module_with_same_prefix() {
        for (crop, module) in CROP_MODULES {
            assert_eq!(module_for_crop(crop), Some(*module));
            assert!(module.starts_with(crop));
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(module_for_crop("mz"), Some("MZCER048"));
        assert_eq!(module_for_crop("QQ"), None);
    }

    #[test]
    fn test_crop_from_extension() {
        assert_eq!(crop_from_extension("UFGA8201.MZX").as_deref(), Some("MZ"));
        assert_eq!(crop_from_extension("lower.snx").as_deref(), Some("SN"));
        assert_eq!(crop_from_extension("UFGA8201.WTH"), None);
        assert_eq!(crop_from_extension("NOEXT"), None);
    }
}
