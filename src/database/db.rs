use log::{error, info};
use mongodb::bson::doc;
use mongodb::{Client, options::ClientOptions};

use super::StoreError;

pub struct Database {
    pub client: Client,
}

impl Database {
    pub async fn init(mongodb_uri: &str) -> Result<Self, StoreError> {
        let mut client_options = ClientOptions::parse(mongodb_uri).await?;
        client_options.app_name = Some("blogging_api".to_string());

        let client = Client::with_options(client_options)?;

        // Ping the server so a bad URI fails at startup instead of on the first request
        client.database("admin").run_command(doc! {"ping": 1}).await?;

        info!("Connected successfully to MongoDB");

        Ok(Self { client })
    }
}

pub async fn connect_to_mongo(mongodb_uri: &str) -> Result<Client, StoreError> {
    let database = Database::init(mongodb_uri).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        e
    })?;
    Ok(database.client)
}
