//! Canonical column names, plus the two source naming schemes.
//!
//! INE exports come with Spanish metadata headers (`DTI_CL_REGION`,
//! `Trimestre Móvil`, …); re-exports of already processed files use the
//! snake_case names directly. The ingest step accepts either and normalizes
//! to the canonical names below before anything else looks at the table.

pub const INDICATOR_CODE: &str = "indicator_code";
pub const INDICATOR: &str = "indicator";
pub const PERIOD_CODE: &str = "period_code";
pub const PERIOD: &str = "period";
pub const REGION_CODE: &str = "region_code";
pub const REGION: &str = "region";
pub const GENDER_CODE: &str = "gender_code";
pub const GENDER: &str = "gender";
pub const VALUE: &str = "value";
pub const FLAG_CODES: &str = "flag_codes";
pub const FLAGS: &str = "flags";

/// Wide-table columns used by the consistency check.
pub const TOTAL: &str = "fuerza_de_trabajo";
pub const MALE: &str = "hombres";
pub const FEMALE: &str = "mujeres";

/// Columns the core requires after renaming.
pub const REQUIRED: [&str; 5] = [INDICATOR_CODE, PERIOD_CODE, REGION_CODE, GENDER_CODE, VALUE];

/// Map a source header (either scheme) to its canonical name.
///
/// Returns `None` for headers the core does not consume; those columns are
/// carried along untouched.
pub fn canonical_name(source: &str) -> Option<&'static str> {
    // INE metadata scheme first, then the already-canonical scheme.
    Some(match source {
        "DTI_CL_INDICADOR" | INDICATOR_CODE => INDICATOR_CODE,
        "Indicador" | INDICATOR => INDICATOR,
        "DTI_CL_TRIMESTRE_MOVIL" | PERIOD_CODE => PERIOD_CODE,
        "Trimestre Móvil" | PERIOD => PERIOD,
        "DTI_CL_REGION" | REGION_CODE => REGION_CODE,
        "Región" | REGION => REGION,
        "DTI_CL_SEXO" | GENDER_CODE => GENDER_CODE,
        "Sexo" | GENDER => GENDER,
        "Value" | VALUE => VALUE,
        "Flag Codes" | FLAG_CODES => FLAG_CODES,
        "Flags" | FLAGS => FLAGS,
        // Wide-table gender columns, used only by the consistency check.
        "fuerza_de_trabajo" => TOTAL,
        "hombres" => MALE,
        "mujeres" => FEMALE,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_schemes_normalize_to_the_same_names() {
        assert_eq!(canonical_name("DTI_CL_REGION"), Some(REGION_CODE));
        assert_eq!(canonical_name("region_code"), Some(REGION_CODE));
        assert_eq!(canonical_name("Trimestre Móvil"), Some(PERIOD));
        assert_eq!(canonical_name("Value"), Some(VALUE));
        assert_eq!(canonical_name("value"), Some(VALUE));
        assert_eq!(canonical_name("unrelated"), None);
    }
}
