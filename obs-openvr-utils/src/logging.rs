use std::{
    env,
    sync::Once,
};

static INIT_LOGGING: Once = Once::new();

const LEVEL_VAR: &'static str = "OBS_OPENVR_LOG";
const DEFAULT_LOG_LEVEL: &'static str = "info";
const MEMBER_CRATES: [&'static str; 2] = ["openvr", "openvr_sys"];

fn non_blank_env(k: &str) -> Option<String> {
    env::var(k)
        .ok()
        .filter(|v| v.len() > 0)
}

fn append_directive(crate_name: &str, level: &str) {
    let prefix = format!("{}=", crate_name);
    let new_value = match non_blank_env("RUST_LOG") {
        Some(ref previous) if previous.split(',').any(|d| d.starts_with(&prefix)) => return,
        Some(previous) => format!("{},{}{}", previous, prefix, level),
        None => format!("{}{}", prefix, level),
    };
    env::set_var("RUST_LOG", &new_value);
}

/// Sets up `env_logger` once, level-controlled by `OBS_OPENVR_LOG` (workspace
/// crates only) with any existing `RUST_LOG` directives left untouched.
pub fn init() {
    INIT_LOGGING.call_once(|| {
        let level = non_blank_env(LEVEL_VAR)
            .unwrap_or_else(|| String::from(DEFAULT_LOG_LEVEL));
        append_directive(env!("CARGO_CRATE_NAME"), &level);
        if level == "debug" || level == "trace" {
            MEMBER_CRATES.iter().for_each(|member| {
                append_directive(member, &level);
            });
        }
        env_logger::init();
    });
}
