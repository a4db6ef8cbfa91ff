use serde::Deserialize;

/// Settings for tests hitting the real services, read from `RJ_LIVE_*` env vars.
#[derive(Deserialize, Debug)]
pub struct TestConfig {
    #[serde(default = "TestConfig::default_paiza_api_key")]
    pub paiza_api_key: String,

    #[serde(default = "TestConfig::default_paiza_settle_delay_ms")]
    pub paiza_settle_delay_ms: u64,
}

impl TestConfig {
    pub fn from_env() -> Self {
        envy::prefixed("RJ_LIVE_")
            .from_env::<Self>()
            .expect("TestConfig::from_env(): Failed to load from env")
    }

    fn default_paiza_api_key() -> String {
        rj_webclient::paiza::GUEST_API_KEY.to_owned()
    }

    fn default_paiza_settle_delay_ms() -> u64 {
        rj_webclient::paiza::DEFAULT_SETTLE_DELAY.as_millis() as u64
    }
}
