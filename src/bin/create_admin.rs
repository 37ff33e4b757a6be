// Bootstrap utility: create (or re-enable) an admin account in a fresh database.
//
// Usage:
//   create_admin <db_path> <username> <password>
//
// Existing users keep their record; only the password is reset and the role is set to admin.

use pallet_tracker::api::user_api::{hash_password, validate_password, validate_username};
use pallet_tracker::db::{init_schema, open_sqlite_connection};
use pallet_tracker::repository::UserRepository;
use pallet_tracker::Role;
use std::sync::{Arc, Mutex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pallet_tracker::logging::init();

    let mut args = std::env::args().skip(1);
    let (db_path, username, password) = match (args.next(), args.next(), args.next()) {
        (Some(d), Some(u), Some(p)) => (d, u, p),
        _ => return Err("usage: create_admin <db_path> <username> <password>".into()),
    };

    let username = validate_username(&username)?.to_string();
    validate_password(&password)?;

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;
    let repo = UserRepository::new(Arc::new(Mutex::new(conn)));

    let hash = hash_password(&password)?;
    match repo.find_by_username(&username)? {
        Some(_) => {
            repo.update_password_hash(&username, &hash)?;
            repo.update_profile(&username, Some(Role::Admin), Some(true))?;
            println!("updated admin user: {}", username);
        }
        None => {
            let id = repo.insert(
                &username,
                &hash,
                Role::Admin,
                chrono::Local::now().naive_local(),
            )?;
            println!("created admin user: {} (id={})", username, id);
        }
    }

    Ok(())
}
