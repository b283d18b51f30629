use desk_config::DeskConfig;

/// Load `.env`, TOML layers and `HELPDESK_*` overrides.
pub fn load_config() -> anyhow::Result<DeskConfig> {
    DeskConfig::load_with_dotenv().map_err(anyhow::Error::from)
}
