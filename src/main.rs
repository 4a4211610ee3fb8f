use std::process::ExitCode;

use mongodb::Client;

use edulift::{
    config,
    indexes::user_indexes,
    models::User,
    schema::user_collection,
    services::db_init,
    summary, SetupResult,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    match run(&settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("setup halted: {}", e);
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: &config::Settings) -> SetupResult<()> {
    tracing::info!("connecting to {} (database {})", settings.mongodb_uri, settings.mongodb_db);

    let client = Client::with_uri_str(&settings.mongodb_uri).await?;
    let db = client.database(&settings.mongodb_db);

    let spec = user_collection(settings.users_collection.as_str());
    let indexes = user_indexes();

    let report = db_init::provision(&db, &spec, &indexes).await?;
    print!("{}", summary::status_lines(&report));

    db_init::verify(&db, &spec.name, &indexes).await?;
    let present = db_init::list_indexes(&db, &spec.name).await?;
    println!();
    print!("{}", summary::index_listing(&present));

    println!();
    println!("🎉 {} collection setup completed", spec.name);
    println!("📖 Validation is strict: only documents matching the schema are accepted.");
    print!("{}", summary::requirements(&spec.rule, &indexes));

    if settings.print_example {
        match summary::example_document(&User::example()) {
            Ok(json) => {
                println!();
                println!("📝 Example valid user document:");
                println!("{json}");
            }
            Err(e) => tracing::warn!("could not render example document: {}", e),
        }
    }

    Ok(())
}
