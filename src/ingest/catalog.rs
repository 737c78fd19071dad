//! Region and gender code catalogs.
//!
//! Fixed, closed vocabularies from the survey's metadata: 17 region codes
//! (`_T` national total plus 16 regions) and 3 gender codes. Unknown codes
//! are passed through unchanged with a logged warning; the mapper never
//! fails.

/// Display name for a known region code.
pub fn known_region(code: &str) -> Option<&'static str> {
    let name = match code {
        "_T" => "Total país",
        "CHL15" => "Región de Arica y Parinacota",
        "CHL01" => "Región de Tarapacá",
        "CHL02" => "Región de Antofagasta",
        "CHL03" => "Región de Atacama",
        "CHL04" => "Región de Coquimbo",
        "CHL05" => "Región de Valparaíso",
        "CHL13" => "Región Metropolitana",
        "CHL06" => "Región del Libertador General Bernardo O'Higgins",
        "CHL07" => "Región del Maule",
        "CHL16" => "Región de Ñuble",
        "CHL08" => "Región del Biobío",
        "CHL09" => "Región de La Araucanía",
        "CHL14" => "Región de Los Ríos",
        "CHL10" => "Región de Los Lagos",
        "CHL11" => "Región Aysén del General Carlos Ibáñez del Campo",
        "CHL12" => "Región de Magallanes y de la Antártica Chilena",
        _ => return None,
    };
    Some(name)
}

/// Display name for a known gender code.
pub fn known_gender(code: &str) -> Option<&'static str> {
    let name = match code {
        "_T" => "Ambos sexos",
        "M" => "Hombres",
        "F" => "Mujeres",
        _ => return None,
    };
    Some(name)
}

/// Map a region code to its display name, falling back to the code itself.
pub fn region_name(code: &str) -> String {
    match known_region(code) {
        Some(name) => name.to_string(),
        None => {
            log::warn!("region code {code:?} not in catalog; keeping code as name");
            code.to_string()
        }
    }
}

/// Map a gender code to its display name, falling back to the code itself.
pub fn gender_name(code: &str) -> String {
    match known_gender(code) {
        Some(name) => name.to_string(),
        None => {
            log::warn!("gender code {code:?} not in catalog; keeping code as name");
            code.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_REGIONS: [&str; 17] = [
        "_T", "CHL01", "CHL02", "CHL03", "CHL04", "CHL05", "CHL06", "CHL07", "CHL08", "CHL09",
        "CHL10", "CHL11", "CHL12", "CHL13", "CHL14", "CHL15", "CHL16",
    ];

    #[test]
    fn every_vocabulary_region_maps() {
        for code in ALL_REGIONS {
            assert!(known_region(code).is_some(), "{code} missing from catalog");
        }
        assert_eq!(region_name("CHL14"), "Región de Los Ríos");
        assert_eq!(region_name("_T"), "Total país");
    }

    #[test]
    fn genders_map_to_documented_names() {
        assert_eq!(gender_name("_T"), "Ambos sexos");
        assert_eq!(gender_name("M"), "Hombres");
        assert_eq!(gender_name("F"), "Mujeres");
    }

    #[test]
    fn unknown_codes_fall_back_to_themselves() {
        assert_eq!(region_name("ZZZ"), "ZZZ");
        assert_eq!(gender_name("X"), "X");
        assert!(known_region("ZZZ").is_none());
        assert!(known_gender("X").is_none());
    }
}
