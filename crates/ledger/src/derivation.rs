use core_types::ItemDraft;

/// Fills in the derived monetary fields of an item draft.
///
/// Two rules, applied in order (the margin consumes the amount, so the
/// amount must be settled first):
///
/// 1. If `amount_kzt` was not supplied and both `price_usd` and
///    `exchange_rate` are present, `amount_kzt = price_usd * exchange_rate`.
/// 2. If `margin` was not supplied and both `amount_kzt` (supplied or just
///    derived) and `cost_price` are present,
///    `margin = amount_kzt - cost_price`.
///
/// Presence is what matters, not the value: a caller-supplied `0` is an
/// explicit override and is never recomputed. Fields the caller filled in
/// are left untouched even when they disagree with the formulas.
pub fn derive(input: ItemDraft) -> ItemDraft {
    let mut out = input;

    if out.amount_kzt.is_none() {
        if let (Some(price_usd), Some(exchange_rate)) = (out.price_usd, out.exchange_rate) {
            out.amount_kzt = Some(price_usd * exchange_rate);
        }
    }

    if out.margin.is_none() {
        if let (Some(amount_kzt), Some(cost_price)) = (out.amount_kzt, out.cost_price) {
            out.margin = Some(amount_kzt - cost_price);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> ItemDraft {
        ItemDraft {
            client_id: 1,
            product_code: "PC-1".to_string(),
            arrival_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            quantity: 1,
            weight: None,
            price_usd: None,
            exchange_rate: None,
            amount_kzt: None,
            cost_price: None,
            margin: None,
            notes: None,
        }
    }

    #[test]
    fn derives_amount_from_price_and_rate_exactly() {
        let mut input = draft();
        input.price_usd = Some(12.5);
        input.exchange_rate = Some(451.3);

        let out = derive(input);
        assert_eq!(out.amount_kzt, Some(12.5 * 451.3));
        assert_eq!(out.margin, None);
    }

    #[test]
    fn derives_margin_after_amount() {
        let mut input = draft();
        input.price_usd = Some(10.0);
        input.exchange_rate = Some(450.0);
        input.cost_price = Some(1000.0);

        let out = derive(input);
        assert_eq!(out.amount_kzt, Some(4500.0));
        assert_eq!(out.margin, Some(3500.0));
    }

    #[test]
    fn derives_margin_from_supplied_amount() {
        let mut input = draft();
        input.amount_kzt = Some(2000.0);
        input.cost_price = Some(500.0);

        let out = derive(input);
        assert_eq!(out.margin, Some(1500.0));
    }

    #[test]
    fn supplied_amount_is_never_overwritten() {
        let mut input = draft();
        input.price_usd = Some(10.0);
        input.exchange_rate = Some(450.0);
        input.amount_kzt = Some(9999.0);

        let out = derive(input);
        assert_eq!(out.amount_kzt, Some(9999.0));
    }

    #[test]
    fn supplied_zero_is_a_valid_override() {
        let mut input = draft();
        input.price_usd = Some(10.0);
        input.exchange_rate = Some(450.0);
        input.amount_kzt = Some(0.0);
        input.cost_price = Some(100.0);

        let out = derive(input);
        // amount stays 0, and the margin derives from it
        assert_eq!(out.amount_kzt, Some(0.0));
        assert_eq!(out.margin, Some(-100.0));
    }

    #[test]
    fn supplied_margin_is_never_overwritten() {
        let mut input = draft();
        input.amount_kzt = Some(2000.0);
        input.cost_price = Some(500.0);
        input.margin = Some(0.0);

        let out = derive(input);
        assert_eq!(out.margin, Some(0.0));
    }

    #[test]
    fn partial_inputs_derive_nothing() {
        let mut input = draft();
        input.price_usd = Some(10.0);

        let out = derive(input.clone());
        assert_eq!(out.amount_kzt, None);
        assert_eq!(out.margin, None);

        input.price_usd = None;
        input.cost_price = Some(100.0);
        let out = derive(input);
        assert_eq!(out.margin, None);
    }

    #[test]
    fn untouched_fields_pass_through() {
        let mut input = draft();
        input.weight = Some(3.2);
        input.notes = Some("fragile".to_string());
        input.price_usd = Some(2.0);
        input.exchange_rate = Some(500.0);

        let out = derive(input);
        assert_eq!(out.weight, Some(3.2));
        assert_eq!(out.notes.as_deref(), Some("fragile"));
        assert_eq!(out.quantity, 1);
    }
}
