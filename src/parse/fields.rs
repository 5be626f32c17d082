//! Ordered field-matching rules for detail-page table rows
//!
//! Every two-cell table row on a detail page becomes a (label, value) pair.
//! The lower-cased label is matched against this table top-to-bottom and the
//! first rule whose keyword appears in the label wins. Ordering therefore
//! matters: "importe del depósito" must precede the bare "depósito", and
//! "tipo de subasta" must precede "valor subasta"-style rules so an
//! ambiguous label lands on the specific field. New fields are additive -
//! append a rule, nothing else changes.

use crate::model::Auction;
use crate::parse::{parse_date, parse_decimal};

/// One label-matching rule: any keyword hit assigns the value to a field
pub struct FieldRule {
    /// Lower-case substrings that select this rule
    pub keywords: &'static [&'static str],
    /// Writes the (cleaned) cell value into the record
    pub apply: fn(&mut Auction, &str),
}

/// The rule table, evaluated top-to-bottom, first match wins
pub static FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        keywords: &["descripción"],
        apply: |a, v| a.description = v.to_string(),
    },
    FieldRule {
        keywords: &["tipo de bien"],
        apply: |a, v| a.asset_type = v.to_string(),
    },
    FieldRule {
        keywords: &["tipo de subasta"],
        apply: |a, v| a.auction_type = v.to_string(),
    },
    FieldRule {
        keywords: &["estado"],
        apply: |a, v| a.status = v.to_string(),
    },
    FieldRule {
        keywords: &["lote"],
        apply: |a, v| a.lot_description = v.to_string(),
    },
    FieldRule {
        keywords: &["provincia"],
        apply: |a, v| a.province = v.to_string(),
    },
    FieldRule {
        keywords: &["localidad"],
        apply: |a, v| a.locality = v.to_string(),
    },
    FieldRule {
        keywords: &["dirección"],
        apply: |a, v| a.address = v.to_string(),
    },
    FieldRule {
        keywords: &["referencia catastral"],
        apply: |a, v| a.cadastral_reference = Some(v.to_string()),
    },
    FieldRule {
        keywords: &["marca"],
        apply: |a, v| a.vehicle_brand = Some(v.to_string()),
    },
    FieldRule {
        keywords: &["modelo"],
        apply: |a, v| a.vehicle_model = Some(v.to_string()),
    },
    FieldRule {
        keywords: &["matrícula"],
        apply: |a, v| a.vehicle_plate = Some(v.to_string()),
    },
    FieldRule {
        keywords: &["cantidad reclamada"],
        apply: |a, v| a.claimed_amount = parse_decimal(v),
    },
    FieldRule {
        keywords: &["valor de tasación", "valor tasación"],
        apply: |a, v| a.appraisal_value = parse_decimal(v),
    },
    FieldRule {
        keywords: &["valor subasta", "valor de subasta"],
        apply: |a, v| a.auction_value = parse_decimal(v),
    },
    FieldRule {
        keywords: &["tramo"],
        apply: |a, v| a.bid_increment = parse_decimal(v),
    },
    FieldRule {
        keywords: &["puja mínima"],
        apply: |a, v| a.min_bid = parse_decimal(v),
    },
    FieldRule {
        keywords: &["puja máxima"],
        apply: |a, v| a.max_bid = parse_decimal(v),
    },
    FieldRule {
        keywords: &["importe del depósito", "depósito"],
        apply: |a, v| a.deposit_amount = parse_decimal(v),
    },
    FieldRule {
        keywords: &["acreedor", "autoridad"],
        apply: |a, v| a.creditor_name = v.to_string(),
    },
    FieldRule {
        keywords: &["fecha de inicio", "apertura"],
        apply: |a, v| a.start_date = parse_date(v),
    },
    FieldRule {
        keywords: &["fecha de conclusión", "cierre"],
        apply: |a, v| a.end_date = parse_date(v),
    },
];

/// Matches a row label against the rule table and applies the first hit
///
/// The label is lower-cased before matching. Returns true if some rule
/// consumed the value; unmatched labels are simply ignored.
pub fn apply_field_rules(auction: &mut Auction, label: &str, value: &str) -> bool {
    let label = label.to_lowercase();
    for rule in FIELD_RULES {
        if rule.keywords.iter().any(|k| label.contains(k)) {
            (rule.apply)(auction, value);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(label: &str, value: &str) -> Auction {
        let mut auction = Auction::default();
        apply_field_rules(&mut auction, label, value);
        auction
    }

    #[test]
    fn test_text_fields() {
        assert_eq!(apply("Provincia", "Madrid").province, "Madrid");
        assert_eq!(apply("Localidad", "Getafe").locality, "Getafe");
        assert_eq!(
            apply("Dirección", "Calle Mayor 1").address,
            "Calle Mayor 1"
        );
        assert_eq!(
            apply("Descripción", "Piso de 80 m2").description,
            "Piso de 80 m2"
        );
    }

    #[test]
    fn test_label_matching_is_case_insensitive() {
        assert_eq!(apply("PROVINCIA", "Sevilla").province, "Sevilla");
        assert_eq!(apply("Estado", "Celebrándose").status, "Celebrándose");
    }

    #[test]
    fn test_monetary_fields_parse_decimals() {
        assert_eq!(
            apply("Valor de tasación", "250.000 €").appraisal_value,
            250000.0
        );
        assert_eq!(apply("Valor subasta", "187.500,00").auction_value, 187500.0);
        assert_eq!(apply("Puja mínima", "-").min_bid, 0.0);
    }

    #[test]
    fn test_specific_keyword_wins_over_generic() {
        // "importe del depósito" and the bare "depósito" share one rule, but
        // "tipo de subasta" must not be swallowed by the auction-value rule.
        let a = apply("Tipo de subasta", "Judicial");
        assert_eq!(a.auction_type, "Judicial");
        assert_eq!(a.auction_value, 0.0);

        let b = apply("Importe del depósito", "5.000 €");
        assert_eq!(b.deposit_amount, 5000.0);
    }

    #[test]
    fn test_date_fields() {
        assert_eq!(
            apply("Fecha de inicio", "15/09/2025").start_date,
            chrono::NaiveDate::from_ymd_opt(2025, 9, 15)
        );
        assert_eq!(apply("Fecha de conclusión", "n/a").end_date, None);
    }

    #[test]
    fn test_creditor_from_either_keyword() {
        assert_eq!(apply("Acreedor", "Banco X").creditor_name, "Banco X");
        assert_eq!(
            apply("Autoridad gestora", "AEAT Madrid").creditor_name,
            "AEAT Madrid"
        );
    }

    #[test]
    fn test_unknown_label_is_ignored() {
        let mut auction = Auction::default();
        let matched = apply_field_rules(&mut auction, "Observaciones", "algo");
        assert!(!matched);
        assert_eq!(auction.description, "");
    }
}
