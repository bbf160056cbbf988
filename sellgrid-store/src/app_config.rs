use sellgrid_order::PricingRules;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub business_rules: PricingRules,
}

impl Config {
    /// Layered load: baked-in defaults, then config files, then
    /// SELLGRID__-prefixed environment overrides
    /// (e.g. `SELLGRID__BUSINESS_RULES__TAX_RATE=0.05`).
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let defaults = PricingRules::default();

        let s = config::Config::builder()
            .set_default(
                "business_rules.free_shipping_threshold",
                defaults.free_shipping_threshold,
            )?
            .set_default("business_rules.base_shipping_fee", defaults.base_shipping_fee)?
            .set_default("business_rules.per_item_surcharge", defaults.per_item_surcharge)?
            .set_default("business_rules.max_shipping_fee", defaults.max_shipping_fee)?
            .set_default("business_rules.tax_rate", defaults.tax_rate)?
            .set_default("business_rules.return_window_days", defaults.return_window_days)?
            .set_default(
                "business_rules.cart_abandonment_minutes",
                defaults.cart_abandonment_minutes,
            )?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("SELLGRID")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }
}
