//! Factor listing command implementation.

use anyhow::Result;
use sagres::factors::{FactorInfo, available_factors};

/// Registered factors whose category contains `category` (case-insensitive).
fn matching(category: Option<&str>) -> Vec<FactorInfo> {
    let filter = category.map(str::to_lowercase);
    available_factors()
        .into_iter()
        .filter(|info| {
            filter
                .as_deref()
                .is_none_or(|f| info.category.to_string().contains(f))
        })
        .collect()
}

/// List registered factors grouped by category.
pub(crate) fn list_factors(category: Option<&str>) -> Result<()> {
    super::banner("Available Factors");

    let factors = matching(category);
    if factors.is_empty() {
        println!("No factors match category '{}'.\n", category.unwrap_or_default());
        return Ok(());
    }

    let mut current = None;
    for info in factors {
        if current != Some(info.category) {
            current = Some(info.category);
            println!("{} - {}", info.category, info.category.description());
            println!("{}", "-".repeat(60));
        }
        println!(
            "  {:22} {} (lookback: {} days)",
            info.name, info.description, info.typical_lookback
        );
    }
    println!();
    println!("Precomputed factors can be analyzed with --factor-file.\n");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagres::traits::FactorCategory;

    #[test]
    fn test_category_filter() {
        assert_eq!(matching(None).len(), available_factors().len());

        let technical = matching(Some("TECH"));
        assert!(!technical.is_empty());
        assert!(technical.iter().all(|f| f.category == FactorCategory::Technical));

        let liquidity = matching(Some("liquid"));
        assert_eq!(liquidity.len(), 1);
        assert_eq!(liquidity[0].name, "trading_volume");

        assert!(matching(Some("nonexistent")).is_empty());
    }
}
