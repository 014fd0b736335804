//! Component category resolution.
//!
//! Rule order, first match wins:
//! 1. keywords in the free-text hint
//! 2. both engine fields set, then both fuselage fields set
//! 3. very thick section on a tiny span reads as a fuselage
//! 4. wing
//!
//! Rule 3 can misclassify a short, thick wing. It is kept as-is.

use shared::{AeroParameters, ComponentCategory};

const FUSELAGE_KEYWORDS: &[&str] = &["fuselage", "body"];
const ENGINE_KEYWORDS: &[&str] = &["engine", "nacelle", "turbine"];
const WING_KEYWORDS: &[&str] = &["wing", "wings"];

/// Thickness (% chord) above which rule 3 applies.
const BODY_THICKNESS_PERCENT: f64 = 70.0;
/// Span below which rule 3 applies.
const BODY_MAX_SPAN: f64 = 1.0;

pub fn resolve(params: &AeroParameters, hint: Option<&str>) -> ComponentCategory {
    if let Some(category) = hint.and_then(category_from_text) {
        return category;
    }

    if params.engine_dimensions().is_some() {
        return ComponentCategory::Engine;
    }
    if params.fuselage_dimensions().is_some() {
        return ComponentCategory::Fuselage;
    }

    if params.thickness > BODY_THICKNESS_PERCENT && params.span < BODY_MAX_SPAN {
        return ComponentCategory::Fuselage;
    }

    ComponentCategory::Wing
}

/// Keyword scan, case-insensitive, in fuselage → engine → wing order.
pub fn category_from_text(text: &str) -> Option<ComponentCategory> {
    let lower = text.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has_any(FUSELAGE_KEYWORDS) {
        Some(ComponentCategory::Fuselage)
    } else if has_any(ENGINE_KEYWORDS) {
        Some(ComponentCategory::Engine)
    } else if has_any(WING_KEYWORDS) {
        Some(ComponentCategory::Wing)
    } else {
        None
    }
}

/// Category of a named component in a compile request ("Main Wing", "Engine Nacelle").
pub fn category_from_name(name: &str) -> Option<ComponentCategory> {
    let lower = name.to_lowercase();
    if lower.contains("wing") {
        Some(ComponentCategory::Wing)
    } else if lower.contains("fuselage") {
        Some(ComponentCategory::Fuselage)
    } else if lower.contains("engine") {
        Some(ComponentCategory::Engine)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fuselage_only() -> AeroParameters {
        AeroParameters {
            fuselage_length: Some(30.0),
            fuselage_diameter: Some(4.0),
            ..AeroParameters::default()
        }
    }

    fn engine_only() -> AeroParameters {
        AeroParameters {
            engine_length: Some(3.0),
            engine_diameter: Some(1.5),
            ..AeroParameters::default()
        }
    }

    #[test]
    fn test_structural_fields_without_hint() {
        assert_eq!(resolve(&fuselage_only(), None), ComponentCategory::Fuselage);
        assert_eq!(resolve(&fuselage_only(), Some("")), ComponentCategory::Fuselage);
        assert_eq!(resolve(&engine_only(), Some("")), ComponentCategory::Engine);
        assert_eq!(resolve(&AeroParameters::default(), Some("")), ComponentCategory::Wing);
    }

    #[test]
    fn test_engine_fields_win_over_fuselage_fields() {
        let mut p = engine_only();
        p.fuselage_length = Some(30.0);
        p.fuselage_diameter = Some(4.0);
        assert_eq!(resolve(&p, None), ComponentCategory::Engine);
    }

    #[test]
    fn test_hint_overrides_fields() {
        assert_eq!(resolve(&engine_only(), Some("wing")), ComponentCategory::Wing);
        assert_eq!(resolve(&engine_only(), Some("a sleek FUSELAGE")), ComponentCategory::Fuselage);
        assert_eq!(resolve(&fuselage_only(), Some("turbine pod")), ComponentCategory::Engine);
    }

    #[test]
    fn test_hint_keyword_priority() {
        // fuselage keywords are checked before engine and wing keywords
        assert_eq!(
            category_from_text("wing mounted to the body"),
            Some(ComponentCategory::Fuselage)
        );
        assert_eq!(
            category_from_text("wing with underslung nacelle"),
            Some(ComponentCategory::Engine)
        );
        assert_eq!(category_from_text("Delta Wings"), Some(ComponentCategory::Wing));
        assert_eq!(category_from_text("something else"), None);
    }

    #[test]
    fn test_unrelated_hint_falls_through() {
        assert_eq!(resolve(&engine_only(), Some("make it red")), ComponentCategory::Engine);
    }

    #[test]
    fn test_single_dimension_field_is_not_enough() {
        let p = AeroParameters {
            engine_length: Some(3.0),
            fuselage_diameter: Some(4.0),
            ..AeroParameters::default()
        };
        assert_eq!(resolve(&p, None), ComponentCategory::Wing);
    }

    #[test]
    fn test_thick_short_span_heuristic() {
        let p = AeroParameters {
            span: 0.8,
            thickness: 80.0,
            ..AeroParameters::default()
        };
        assert_eq!(resolve(&p, None), ComponentCategory::Fuselage);

        let wide = AeroParameters {
            span: 1.0,
            thickness: 80.0,
            ..AeroParameters::default()
        };
        assert_eq!(resolve(&wide, None), ComponentCategory::Wing);
    }

    #[test]
    fn test_category_from_name() {
        assert_eq!(category_from_name("Swept Wing"), Some(ComponentCategory::Wing));
        assert_eq!(category_from_name("Commercial Fuselage"), Some(ComponentCategory::Fuselage));
        assert_eq!(category_from_name("Engine Nacelle"), Some(ComponentCategory::Engine));
        assert_eq!(category_from_name("Landing gear"), None);
    }
}
