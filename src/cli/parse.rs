//! Parse command implementation

use crate::config::Config;
use crate::feed::parse_ticker;
use crate::project::Projector;
use clap::Args;

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Raw ticker JSON payload, e.g. '{"c":"64000.00","P":"1.2","q":"900"}'
    pub payload: String,
}

impl ParseArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let tick = parse_ticker(&self.payload)?;
        println!("{}", serde_json::to_string_pretty(&tick)?);

        for widget in &config.widgets {
            match widget.projection.display(&tick, None) {
                Ok(display) => println!("{:<12} {}", widget.name, display.price),
                Err(e) => {
                    tracing::warn!(widget = %widget.name, error = %e, "Tick cannot be projected");
                    println!("{:<12} unavailable", widget.name);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_valid_payload() {
        let args = ParseArgs {
            payload: r#"{"c":"64000.00","P":"1.2","q":"900"}"#.to_string(),
        };
        assert!(args.execute(&Config::default()).is_ok());
    }

    #[test]
    fn test_execute_out_of_range_projection() {
        let config: Config = toml::from_str(
            r#"
            [[widgets]]
            name = "double"
            projection = { kind = "scaled", reference_price = "0.5", scale_factor = "2" }
            "#,
        )
        .unwrap();
        let args = ParseArgs {
            payload: format!(r#"{{"c":"{}"}}"#, rust_decimal::Decimal::MAX),
        };
        assert!(args.execute(&config).is_ok());
    }

    #[test]
    fn test_execute_malformed_payload() {
        let args = ParseArgs {
            payload: "garbage".to_string(),
        };
        assert!(args.execute(&Config::default()).is_err());
    }
}
