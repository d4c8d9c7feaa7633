/// SKU-based rightsizing heuristics. There are no utilization metrics here:
/// a VM is flagged purely because its size belongs to a family listed in
/// `OVERSIZED_FAMILIES`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::to_money;
use crate::models::{Recommendation, VmDescriptor};

pub const VIRTUAL_MACHINE: &str = "Virtual Machine";
const OVERSIZING_REASON: &str = "Potential oversizing based on VM class";

struct OversizedFamily {
    pattern: &'static str,
    token: &'static str,
    replacement: &'static str,
}

const OVERSIZED_FAMILIES: &[OversizedFamily] = &[
    OversizedFamily {
        pattern: "Standard_D4s",
        token: "D4s",
        replacement: "D2s",
    },
    OversizedFamily {
        pattern: "Standard_E8s",
        token: "E8s",
        replacement: "E4s",
    },
];

/// Estimated monthly cost in cents, keyed by SKU family prefix.
const MONTHLY_COST_CENTS: &[(&str, i64)] = &[
    ("Standard_D4s", 24_530),
    ("Standard_E8s", 52_045),
    ("Standard_D2s", 12_265),
    ("Standard_E4s", 26_022),
];
const DEFAULT_MONTHLY_COST_CENTS: i64 = 10_000;

/// Share of the current cost saved by dropping one size.
const SAVINGS_FRACTION: (i64, u32) = (5, 1);

pub fn estimate_monthly_cost(size_label: &str) -> Decimal {
    let cents = MONTHLY_COST_CENTS
        .iter()
        .find(|(pattern, _)| size_label.contains(pattern))
        .map(|(_, cents)| *cents)
        .unwrap_or(DEFAULT_MONTHLY_COST_CENTS);
    Decimal::new(cents, 2)
}

pub fn recommend(vm: &VmDescriptor) -> Option<Recommendation> {
    let family = OVERSIZED_FAMILIES
        .iter()
        .find(|f| vm.size_label.contains(f.pattern))?;

    let recommended = vm.size_label.replacen(family.token, family.replacement, 1);
    let current_cost = estimate_monthly_cost(&vm.size_label);
    let (num, scale) = SAVINGS_FRACTION;
    let savings = current_cost * Decimal::new(num, scale);

    Some(Recommendation {
        resource_name: vm.name.clone(),
        resource_type: VIRTUAL_MACHINE.into(),
        resource_group: vm.resource_group.clone(),
        current_configuration: vm.size_label.clone(),
        recommended_configuration: recommended,
        current_monthly_cost: to_money(current_cost),
        potential_savings: to_money(savings),
        reason: OVERSIZING_REASON.into(),
    })
}

/// VMs outside the oversized families yield nothing.
pub fn derive_recommendations(vms: &[VmDescriptor]) -> Vec<Recommendation> {
    vms.iter().filter_map(recommend).collect()
}

/// Sum of `potential_savings`, exact in decimal so the result does not depend
/// on input order.
pub fn calculate_total_savings(recommendations: &[Recommendation]) -> Decimal {
    recommendations
        .iter()
        .filter_map(|r| Decimal::from_f64(r.potential_savings))
        .map(|d| d.round_dp(2))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm(name: &str, size: &str) -> VmDescriptor {
        VmDescriptor {
            name: name.into(),
            size_label: size.into(),
            resource_group: "rg".into(),
        }
    }

    #[test]
    fn test_d4s_downsizes_to_d2s() {
        let recs = derive_recommendations(&[vm("app01", "Standard_D4s_v3")]);

        assert_eq!(recs.len(), 1);
        let rec = &recs[0];
        assert_eq!(rec.resource_name, "app01");
        assert_eq!(rec.resource_type, "Virtual Machine");
        assert_eq!(rec.current_configuration, "Standard_D4s_v3");
        assert_eq!(rec.recommended_configuration, "Standard_D2s_v3");
        assert_eq!(rec.current_monthly_cost, 245.30);
        assert_eq!(rec.potential_savings, 122.65);
        assert_eq!(rec.resource_group, "rg");
    }

    #[test]
    fn test_e8s_downsizes_to_e4s() {
        let rec = recommend(&vm("db01", "Standard_E8s_v5")).unwrap();
        assert_eq!(rec.recommended_configuration, "Standard_E4s_v5");
        assert_eq!(rec.current_monthly_cost, 520.45);
        // 260.225 rounds half to even
        assert_eq!(rec.potential_savings, 260.22);
    }

    #[test]
    fn test_unmatched_sku_is_skipped() {
        let recs = derive_recommendations(&[
            vm("a", "Standard_F2s_v2"),
            vm("b", "Standard_D2s_v3"),
            vm("c", "Standard_B1ms"),
        ]);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_savings_below_current_cost() {
        let vms = vec![
            vm("a", "Standard_D4s_v3"),
            vm("b", "Standard_E8s_v3"),
            vm("c", "Standard_D4s_v4"),
        ];
        for rec in derive_recommendations(&vms) {
            assert!(rec.potential_savings >= 0.0);
            assert!(rec.potential_savings < rec.current_monthly_cost);
        }
    }

    #[test]
    fn test_cost_table() {
        assert_eq!(estimate_monthly_cost("Standard_D2s_v3"), Decimal::new(12_265, 2));
        assert_eq!(estimate_monthly_cost("Standard_E4s_v3"), Decimal::new(26_022, 2));
        assert_eq!(estimate_monthly_cost("Standard_A1"), Decimal::new(10_000, 2));
    }

    #[test]
    fn test_total_savings_empty() {
        assert_eq!(calculate_total_savings(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_total_savings_order_invariant() {
        let mut recs = derive_recommendations(&[
            vm("a", "Standard_D4s_v3"),
            vm("b", "Standard_E8s_v3"),
            vm("c", "Standard_D4s_v5"),
        ]);
        let forward = calculate_total_savings(&recs);
        recs.reverse();
        let backward = calculate_total_savings(&recs);

        assert_eq!(forward, backward);
        assert_eq!(forward, Decimal::new(50_552, 2));
    }
}
