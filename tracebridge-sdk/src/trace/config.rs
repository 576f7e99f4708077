//! SDK Configuration
//!
//! Configuration holds the sampler, the id generator and the service name a
//! [`TracerProvider`](crate::trace::TracerProvider) uses. `Config::default()`
//! starts from built-in defaults and applies the standard environment
//! variables on top:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `OTEL_TRACES_SAMPLER` | `always_on`, `always_off`, `traceidratio`, `parentbased_always_on`, `parentbased_always_off`, `parentbased_traceidratio` |
//! | `OTEL_TRACES_SAMPLER_ARG` | ratio for the `*traceidratio` samplers |
//! | `OTEL_SERVICE_NAME` | service name recorded on every exported span |
use crate::trace::{IdGenerator, RandomIdGenerator, Sampler};
use std::borrow::Cow;
use std::env;
use tracebridge::bridge_warn;

const DEFAULT_SERVICE_NAME: &str = "unknown_service";

/// Tracer configuration
#[derive(Debug)]
#[non_exhaustive]
pub struct Config {
    /// The sampler that the sdk should use
    pub sampler: Sampler,

    /// The id generator that the sdk should use
    pub id_generator: Box<dyn IdGenerator>,

    /// Name of the service producing the spans.
    pub service_name: Cow<'static, str>,
}

impl Default for Config {
    /// Create default sdk configuration, honouring the environment.
    fn default() -> Self {
        let mut config = Config {
            sampler: Sampler::ParentBased(Box::new(Sampler::AlwaysOn)),
            id_generator: Box::<RandomIdGenerator>::default(),
            service_name: Cow::Borrowed(DEFAULT_SERVICE_NAME),
        };

        if let Some(service_name) = env::var("OTEL_SERVICE_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty())
        {
            config.service_name = Cow::Owned(service_name);
        }

        let sampler_arg = env::var("OTEL_TRACES_SAMPLER_ARG").ok();
        if let Ok(sampler) = env::var("OTEL_TRACES_SAMPLER") {
            config.sampler = match sampler.as_str() {
                "always_on" => Sampler::AlwaysOn,
                "always_off" => Sampler::AlwaysOff,
                "traceidratio" => {
                    Sampler::TraceIdRatioBased(ratio_or_default(&sampler, sampler_arg.as_deref()))
                }
                "parentbased_always_on" => Sampler::ParentBased(Box::new(Sampler::AlwaysOn)),
                "parentbased_always_off" => Sampler::ParentBased(Box::new(Sampler::AlwaysOff)),
                "parentbased_traceidratio" => Sampler::ParentBased(Box::new(
                    Sampler::TraceIdRatioBased(ratio_or_default(&sampler, sampler_arg.as_deref())),
                )),
                s => {
                    bridge_warn!(
                        name: "TracerProvider.Config.InvalidSamplerType",
                        message = format!(
                            "Unrecognized sampler type '{}' in OTEL_TRACES_SAMPLER environment variable. Valid values are: always_on, always_off, traceidratio, parentbased_always_on, parentbased_always_off, parentbased_traceidratio. Using fallback sampler: ParentBased(AlwaysOn)",
                            s
                        ),
                    );
                    Sampler::ParentBased(Box::new(Sampler::AlwaysOn))
                }
            }
        }

        config
    }
}

fn ratio_or_default(sampler: &str, arg: Option<&str>) -> f64 {
    match arg.and_then(|r| r.parse::<f64>().ok()) {
        Some(ratio) if (0.0..=1.0).contains(&ratio) => ratio,
        _ => {
            bridge_warn!(
                name: "TracerProvider.Config.InvalidSamplerArgument",
                message = format!(
                    "OTEL_TRACES_SAMPLER is set to '{}' but OTEL_TRACES_SAMPLER_ARG is missing or not a float between 0.0 and 1.0. Falling back to default ratio: 1.0 (100% sampling)",
                    sampler
                ),
                otel_traces_sampler_arg = format!("{:?}", arg)
            );
            1.0
        }
    }
}
