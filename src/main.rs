use anyhow::{bail, Context};
use itertools::Itertools;
use shelf_db_rust::config::AppConfig;
use shelf_db_rust::{bootstrap, migration_runner, DatabaseContext};

const USAGE: &str = "usage: shelf-db-rust [provision | provision-tenant <schema> | clone-schema <source> <target> | drop-database]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info) // Default to Info for everything
        .filter_module("sqlx", LevelFilter::Warn) // Suppress sqlx Debug logs
        .parse_default_env()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("provision");

    match (command, &args[1.min(args.len())..]) {
        ("provision", []) => {
            let (_, ctx) = bootstrap().await?;
            println!("Database '{}' is ready", ctx.settings().database_name);
            ctx.shutdown().await;
        }
        ("provision-tenant", [schema]) => {
            let (_, ctx) = bootstrap().await?;
            let report = ctx
                .provision_tenant(schema)
                .await
                .with_context(|| format!("Failed to provision tenant '{}'", schema))?;
            println!(
                "Tenant '{}' ready: created [{}], already present [{}]",
                schema,
                report.created.iter().join(", "),
                report.skipped.iter().join(", ")
            );
            ctx.shutdown().await;
        }
        ("clone-schema", [source, target]) => {
            let (_, ctx) = bootstrap().await?;
            let report = ctx
                .clone_schema(source, target)
                .await
                .with_context(|| format!("Failed to clone '{}' into '{}'", source, target))?;
            println!("Cloned {} table(s) into '{}'", report.created.len(), target);
            ctx.shutdown().await;
        }
        ("drop-database", []) => {
            dotenvy::dotenv().ok();
            let config = AppConfig::load()?;
            let ctx = DatabaseContext::new(config.database_settings()?, migration_runner(&config));
            if ctx.provisioner().drop_database().await? {
                println!("Database '{}' dropped", ctx.settings().database_name);
            } else {
                println!("Database '{}' does not exist", ctx.settings().database_name);
            }
        }
        _ => bail!(USAGE),
    }

    Ok(())
}
