//! Shared setup for the PetFriends suite.
//!
//! By default every test gets its own mock service on a random port. Set
//! `PETFRIENDS_BASE_URL`, `PETFRIENDS_EMAIL` and `PETFRIENDS_PASSWORD` to run
//! the same scenarios against a real deployment instead.

#![allow(dead_code)]

use std::path::PathBuf;

use mock_server::{config, Account, ServerConfig};
use petfriends_core::{BlockingTransport, Credential, PetFriendsClient, PetList};

/// Credentials and endpoint the suite runs against.
pub struct Settings {
    pub base_url: Option<String>,
    pub email: String,
    pub password: String,
}

impl Settings {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            base_url: var("PETFRIENDS_BASE_URL"),
            email: var("PETFRIENDS_EMAIL").unwrap_or_else(|| config::DEFAULT_EMAIL.to_string()),
            password: var("PETFRIENDS_PASSWORD")
                .unwrap_or_else(|| config::DEFAULT_PASSWORD.to_string()),
        }
    }
}

pub struct Service {
    pub client: PetFriendsClient<BlockingTransport>,
    pub email: String,
    pub password: String,
    /// True when this suite spawned the mock service itself.
    pub local: bool,
}

impl Service {
    pub fn start() -> Self {
        let settings = Settings::from_env();
        let local = settings.base_url.is_none();
        let base_url = match settings.base_url {
            Some(url) => url,
            None => spawn_mock(ServerConfig {
                accounts: vec![Account::new(&settings.email, &settings.password)],
                ..ServerConfig::default()
            }),
        };
        Self {
            client: PetFriendsClient::with_base_url(&base_url, BlockingTransport::new().unwrap()),
            email: settings.email,
            password: settings.password,
            local,
        }
    }

    pub fn credential(&self) -> Credential {
        let resp = self.client.get_api_key(&self.email, &self.password).unwrap();
        assert_eq!(resp.status, 200, "get_api_key: {:?}", resp.body);
        resp.credential().expect("key field in get_api_key body")
    }

    pub fn pets(&self, credential: &Credential, filter: &str) -> PetList {
        let resp = self.client.get_list_of_pets(credential, filter).unwrap();
        assert_eq!(resp.status, 200, "get_list_of_pets: {:?}", resp.body);
        resp.decode().expect("pets list body")
    }

    /// Id of one of the caller's pets, creating one if there are none.
    pub fn own_pet_id(&self, credential: &Credential) -> String {
        if let Some(pet) = self.pets(credential, "my_pets").pets.first() {
            return pet.id.clone();
        }
        let resp = self.client.create_pet_simple(credential, "Mishka", "cat", "1").unwrap();
        assert_eq!(resp.status, 200, "create_pet_simple: {:?}", resp.body);
        resp.field("id").and_then(|v| v.as_str()).unwrap().to_string()
    }
}

/// Run the mock service on its own thread and return its base URL.
pub fn spawn_mock(config: ServerConfig) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, config).await
        })
        .unwrap();
    });

    format!("http://{addr}/")
}

pub fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative)
}
