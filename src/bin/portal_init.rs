//! Prepare a portal directory: create data and upload directories, repair
//! missing or corrupt collections, and print a short summary.
//!
//! Layout comes from `PORTAL_BASE_DIR`, `PORTAL_DATA_DIR` and
//! `PORTAL_UPLOAD_DIR`. Set `RUST_LOG=debug` to see each recovery step.

use school_portal_store::{Admin, Portal, PortalConfig, Student, Teacher};

fn main() -> Result<(), school_portal_store::Error> {
    env_logger::init();

    let config = PortalConfig::from_env()?;
    let portal = Portal::open(&config)?;

    let store = portal.store();
    println!("data dir   = {}", config.data_dir().display());
    println!("upload dir = {}", config.upload_dir().display());
    println!("students   = {}", store.collection::<Student>().load().len());
    println!("teachers   = {}", store.collection::<Teacher>().load().len());
    println!("admins     = {}", store.collection::<Admin>().load().len());
    println!("status     = {}", portal.status());
    Ok(())
}
