use crate::classify;
use crate::console::Console;
use crate::plan::BootstrapPlan;
use bson::{Bson, Document, doc};
use init_errors::MongoErr;
use mongodb::{Database, IndexModel};
use std::io::Write;
use tracing::{debug, info, instrument, warn};

const APP_PROBE_COLLECTION: &str = "test";
const ADMIN_PROBE_COLLECTION: &str = "test_admin";
const ADMIN_PROBE_INDEX_FIELD: &str = "test_field";

/// What a permission probe needs from a database
#[allow(async_fn_in_trait)]
pub trait ProbeTarget {
    /// Returns the `_id` of the inserted document
    async fn insert_marker(&self, collection: &str, owner: &str) -> Result<Bson, MongoErr>;

    async fn find_marker(&self, collection: &str, id: &Bson) -> Result<bool, MongoErr>;

    async fn delete_marker(&self, collection: &str, id: &Bson) -> Result<(), MongoErr>;

    async fn create_index(&self, collection: &str, field: &str) -> Result<(), MongoErr>;

    async fn drop_collection(&self, collection: &str) -> Result<(), MongoErr>;
}

impl ProbeTarget for Database {
    async fn insert_marker(&self, collection: &str, owner: &str) -> Result<Bson, MongoErr> {
        let res = self
            .collection::<Document>(collection)
            .insert_one(doc! {"test": owner})
            .await
            .map_err(classify)?;
        Ok(res.inserted_id)
    }

    async fn find_marker(&self, collection: &str, id: &Bson) -> Result<bool, MongoErr> {
        let found = self
            .collection::<Document>(collection)
            .find_one(doc! {"_id": id.clone()})
            .await
            .map_err(classify)?;
        Ok(found.is_some())
    }

    async fn delete_marker(&self, collection: &str, id: &Bson) -> Result<(), MongoErr> {
        let res = self
            .collection::<Document>(collection)
            .delete_one(doc! {"_id": id.clone()})
            .await
            .map_err(classify)?;
        debug!(deleted = res.deleted_count);
        Ok(())
    }

    async fn create_index(&self, collection: &str, field: &str) -> Result<(), MongoErr> {
        let mut keys = Document::new();
        keys.insert(field, 1);

        self.collection::<Document>(collection)
            .create_index(IndexModel::builder().keys(keys).build())
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), MongoErr> {
        self.collection::<Document>(collection)
            .drop()
            .await
            .map_err(classify)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyReport {
    pub app_user_ok: bool,
    pub admin_ok: bool,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.app_user_ok && self.admin_ok
    }
}

/// Probe both accounts, `app` connected as the application user and `admin` as the administrator
///
/// A failing account does not prevent the other one from being probed
#[instrument(skip_all)]
pub async fn verify<A, B, W>(
    app: &A,
    admin: &B,
    plan: &BootstrapPlan,
    console: &mut Console<W>,
) -> VerifyReport
where
    A: ProbeTarget,
    B: ProbeTarget,
    W: Write,
{
    let app_name = &plan.app_user.name;
    let admin_name = &plan.admin_user.name;

    console.line("=== TEST UTILISATEUR APPLICATIF ===");
    let res = probe_app_user(app, app_name, console).await;
    let app_user_ok = conclude(res, app_name, console);

    console.line("");
    console.line("=== TEST ADMINISTRATEUR HEALTHCARE ===");
    let res = probe_admin(admin, admin_name, console).await;
    let admin_ok = conclude(res, admin_name, console);

    VerifyReport {
        app_user_ok,
        admin_ok,
    }
}

async fn probe_app_user<T: ProbeTarget, W: Write>(
    target: &T,
    user: &str,
    console: &mut Console<W>,
) -> Result<(), MongoErr> {
    let id = target.insert_marker(APP_PROBE_COLLECTION, user).await?;
    console.line(format_args!("✅ Écriture réussie pour {user}"));

    if !target.find_marker(APP_PROBE_COLLECTION, &id).await? {
        return Err(MongoErr::Other(format!(
            "document {id} not found after insert"
        )));
    }
    console.line(format_args!("✅ Lecture réussie pour {user}"));

    target.delete_marker(APP_PROBE_COLLECTION, &id).await?;
    console.line(format_args!("✅ Suppression réussie pour {user}"));

    Ok(())
}

async fn probe_admin<T: ProbeTarget, W: Write>(
    target: &T,
    user: &str,
    console: &mut Console<W>,
) -> Result<(), MongoErr> {
    target
        .create_index(ADMIN_PROBE_COLLECTION, ADMIN_PROBE_INDEX_FIELD)
        .await?;
    console.line(format_args!("✅ Création d'index réussie pour {user}"));

    target.insert_marker(ADMIN_PROBE_COLLECTION, user).await?;
    console.line(format_args!("✅ Écriture réussie pour {user}"));

    target.drop_collection(ADMIN_PROBE_COLLECTION).await?;
    console.line(format_args!("✅ Suppression de collection réussie pour {user}"));

    Ok(())
}

fn conclude<W: Write>(res: Result<(), MongoErr>, user: &str, console: &mut Console<W>) -> bool {
    match res {
        Ok(()) => {
            info!(user, "Permissions verified");
            true
        }
        Err(e) => {
            warn!(user, %e, "Permission probe failed");
            console.line(format_args!("❌ Erreur {user} : {}", e.message()));
            false
        }
    }
}
