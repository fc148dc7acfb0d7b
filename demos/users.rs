use anyhow::Context;
use docstore_kit::Driver;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Address {
    street: String,
    city: String,
    state: String,
    country: String,
    zip_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    name: String,
    age: u32,
    contact: String,
    company: String,
    address: Address,
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug shows what the driver does on disk
    env_logger::init();

    let root = std::env::temp_dir().join("docstore_users");
    println!("Database dir: {}", root.display());

    let db = Driver::new(&root).context("unable to open the database")?;

    let address = Address {
        street: "Example".into(),
        city: "Example City".into(),
        state: "Example State".into(),
        country: "USA".into(),
        zip_code: "11111".into(),
    };
    let users = ["TeAndre Smith", "John", "Timmy"].map(|name| User {
        name: name.to_string(),
        age: 23,
        contact: "08064807641".into(),
        company: "Google".into(),
        address: address.clone(),
    });

    for user in &users {
        db.write("users", &user.name, user)
            .with_context(|| format!("unable to save {}", user.name))?;
    }

    let records = db.read_all("users")?;
    println!("{} raw records:", records.len());
    for record in &records {
        print!("{}", String::from_utf8_lossy(record));
    }

    let found: Vec<User> = db.read_all_as("users")?;
    for user in &found {
        println!("{} ({}) works at {}", user.name, user.age, user.company);
    }

    let timmy: User = db.read("users", "Timmy.json")?;
    println!("Deleting {}", timmy.name);
    db.delete("users", "Timmy")?;

    let records = db.read_all("users")?;
    println!("{} records left", records.len());

    Ok(())
}
