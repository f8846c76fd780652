//! Pricing Catalog
//!
//! Static service → complexity → price table, defined once at first use.
//! Keys match the values used by the pricing form; labels are the
//! human-readable option texts carried through the handoff for display.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// How an entry is priced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Price {
    /// One-off project price in USD.
    Fixed(Decimal),
    /// Per-hour rate in USD; billed one hour up front, then incrementally.
    Hourly(Decimal),
    /// No collectible price; customer must contact directly.
    Contact,
}

/// A single priced offering.
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    pub price: Price,
    pub label: &'static str,
    pub description: &'static str,
    /// Sub-tiers (e.g. Shopify starter/growth/scale). When present, a
    /// tier selection is mandatory and this entry's own price is unset.
    pub tiers: Option<BTreeMap<&'static str, CatalogEntry>>,
}

impl CatalogEntry {
    fn fixed(price: Decimal, label: &'static str, description: &'static str) -> Self {
        Self {
            price: Price::Fixed(price),
            label,
            description,
            tiers: None,
        }
    }

    fn hourly(rate: Decimal, label: &'static str, description: &'static str) -> Self {
        Self {
            price: Price::Hourly(rate),
            label,
            description,
            tiers: None,
        }
    }

    fn contact(label: &'static str, description: &'static str) -> Self {
        Self {
            price: Price::Contact,
            label,
            description,
            tiers: None,
        }
    }

    fn tiered(
        label: &'static str,
        tiers: impl IntoIterator<Item = (&'static str, CatalogEntry)>,
    ) -> Self {
        Self {
            price: Price::Contact,
            label,
            description: "",
            tiers: Some(tiers.into_iter().collect()),
        }
    }

    /// True when a tier must be chosen before a quote can be derived.
    pub fn has_tiers(&self) -> bool {
        self.tiers.is_some()
    }
}

/// One service category with its complexity levels.
#[derive(Clone, Debug)]
pub struct ServiceCategory {
    pub label: &'static str,
    pub complexities: BTreeMap<&'static str, CatalogEntry>,
}

/// The full pricing catalog.
#[derive(Clone, Debug)]
pub struct Catalog {
    services: BTreeMap<&'static str, ServiceCategory>,
}

static CATALOG: OnceLock<Catalog> = OnceLock::new();

impl Catalog {
    /// The standard catalog, built once per process.
    pub fn standard() -> &'static Catalog {
        CATALOG.get_or_init(Self::build)
    }

    /// Look up a service category by key.
    pub fn service(&self, service: &str) -> Option<&ServiceCategory> {
        self.services.get(service)
    }

    /// Look up a complexity entry under a service.
    pub fn entry(&self, service: &str, complexity: &str) -> Option<&CatalogEntry> {
        self.services.get(service)?.complexities.get(complexity)
    }

    /// Look up a tier entry under a tiered complexity.
    pub fn tier_entry(&self, service: &str, complexity: &str, tier: &str) -> Option<&CatalogEntry> {
        self.entry(service, complexity)?.tiers.as_ref()?.get(tier)
    }

    /// Iterate all leaf entries (tiers expanded), for invariant checks.
    pub fn leaf_entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.services.values().flat_map(|svc| {
            svc.complexities.values().flat_map(|entry| match &entry.tiers {
                Some(tiers) => tiers.values().collect::<Vec<_>>(),
                None => vec![entry],
            })
        })
    }

    fn build() -> Catalog {
        let website = ServiceCategory {
            label: "Website Development",
            complexities: BTreeMap::from([
                (
                    "hosting-platform",
                    CatalogEntry::fixed(
                        dec!(850),
                        "Hosting Platform (GoDaddy, Wix, WordPress)",
                        "Website using hosting platforms like GoDaddy, Wix, or WordPress",
                    ),
                ),
                (
                    "shopify",
                    CatalogEntry::tiered(
                        "Shopify",
                        [
                            (
                                "starter",
                                CatalogEntry::fixed(
                                    dec!(2500),
                                    "Starter",
                                    "Basic storefront, stripe checkout and product pages",
                                ),
                            ),
                            (
                                "growth",
                                CatalogEntry::fixed(
                                    dec!(5000),
                                    "Growth",
                                    "Custom design, admin dashboard and inventory logic",
                                ),
                            ),
                            (
                                "scale",
                                CatalogEntry::fixed(
                                    dec!(20000),
                                    "Scale",
                                    "Multi-store support, subscriptions, analytics CI/CD",
                                ),
                            ),
                        ],
                    ),
                ),
                (
                    "basic",
                    CatalogEntry::fixed(
                        dec!(3000),
                        "Basic Custom-Built",
                        "Basic custom-built website coded from scratch",
                    ),
                ),
                (
                    "advanced",
                    CatalogEntry::fixed(
                        dec!(20000),
                        "Advanced Custom-Built",
                        "Advanced custom website with complex features",
                    ),
                ),
                (
                    "enterprise",
                    CatalogEntry::contact("Enterprise Level", "Enterprise-level website solution"),
                ),
            ]),
        };

        let mobile = ServiceCategory {
            label: "Mobile App Development",
            complexities: BTreeMap::from([
                (
                    "basic",
                    CatalogEntry::fixed(
                        dec!(15000),
                        "Basic",
                        "Basic mobile app for iOS and Android",
                    ),
                ),
                (
                    "advanced",
                    CatalogEntry::fixed(
                        dec!(50000),
                        "Advanced",
                        "Advanced mobile app with complex features",
                    ),
                ),
                (
                    "enterprise",
                    CatalogEntry::contact("Enterprise", "Enterprise-level mobile application"),
                ),
            ]),
        };

        let ai = ServiceCategory {
            label: "AI Development",
            complexities: BTreeMap::from([
                (
                    "api-integration",
                    CatalogEntry::fixed(
                        dec!(20000),
                        "Existing Model Integration (ChatGPT, Copilot, etc.)",
                        "Existing Model integration (ChatGPT, Copilot, etc.)",
                    ),
                ),
                (
                    "basic-model",
                    CatalogEntry::fixed(
                        dec!(5000000),
                        "Basic Model (Built from Scratch)",
                        "Building and training a basic AI model from scratch",
                    ),
                ),
                (
                    "advanced-model",
                    CatalogEntry::fixed(
                        dec!(75000000),
                        "Advanced Model (Built from Scratch)",
                        "Building and training an advanced AI model from scratch",
                    ),
                ),
                (
                    "enterprise",
                    CatalogEntry::contact(
                        "Enterprise",
                        "Enterprise AI solution with custom requirements",
                    ),
                ),
            ]),
        };

        let blockchain = ServiceCategory {
            label: "Blockchain Development",
            complexities: BTreeMap::from([
                (
                    "basic",
                    CatalogEntry::fixed(
                        dec!(70000),
                        "Basic",
                        "Basic blockchain development and smart contracts",
                    ),
                ),
                (
                    "advanced",
                    CatalogEntry::fixed(
                        dec!(200000),
                        "Advanced",
                        "Advanced blockchain solution with DeFi/NFT features",
                    ),
                ),
                (
                    "enterprise",
                    CatalogEntry::contact("Enterprise", "Enterprise blockchain infrastructure"),
                ),
            ]),
        };

        let maintenance = ServiceCategory {
            label: "Maintenance & Support",
            complexities: BTreeMap::from([
                (
                    "standard",
                    CatalogEntry::hourly(
                        dec!(175),
                        "Standard Maintenance (Business Hours)",
                        "Standard maintenance - Regular bug fixes, feature updates, security \
                         patches, and performance optimization during business hours (9am-5pm)",
                    ),
                ),
                (
                    "priority",
                    CatalogEntry::hourly(
                        dec!(225),
                        "Priority Support (24/7)",
                        "Priority support - Same-day response, 24/7 availability, emergency \
                         fixes, and immediate deployment",
                    ),
                ),
            ]),
        };

        Catalog {
            services: BTreeMap::from([
                ("website", website),
                ("mobile", mobile),
                ("ai", ai),
                ("blockchain", blockchain),
                ("maintenance", maintenance),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_all_services() {
        let catalog = Catalog::standard();
        for key in ["website", "mobile", "ai", "blockchain", "maintenance"] {
            assert!(catalog.service(key).is_some(), "missing service {key}");
        }
    }

    #[test]
    fn shopify_is_tiered() {
        let catalog = Catalog::standard();
        let entry = catalog.entry("website", "shopify").unwrap();
        assert!(entry.has_tiers());
        let tiers = entry.tiers.as_ref().unwrap();
        assert_eq!(tiers.len(), 3);
        assert_eq!(
            catalog.tier_entry("website", "shopify", "growth").unwrap().price,
            Price::Fixed(dec!(5000))
        );
    }

    #[test]
    fn maintenance_entries_are_hourly() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.entry("maintenance", "standard").unwrap().price,
            Price::Hourly(dec!(175))
        );
        assert_eq!(
            catalog.entry("maintenance", "priority").unwrap().price,
            Price::Hourly(dec!(225))
        );
    }

    #[test]
    fn unknown_keys_return_none() {
        let catalog = Catalog::standard();
        assert!(catalog.service("gamedev").is_none());
        assert!(catalog.entry("website", "quantum").is_none());
        assert!(catalog.tier_entry("website", "shopify", "hyperscale").is_none());
    }
}
