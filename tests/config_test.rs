use std::env;

#[test]
#[should_panic(expected = "DISCORD_TOKEN")]
fn test_config_missing_token_panics() {
    env::remove_var("DISCORD_TOKEN");
    arena_bot::config::Config::from_env();
}
