use crate::classify;
use crate::plan::NewUser;
use bson::doc;
use init_errors::MongoErr;
use mongodb::{Client, Database};
use tracing::{debug, instrument};

/// The server side of the bootstrap: hands out database contexts
pub trait AdminApi {
    type Db: DatabaseApi;

    /// Selecting a database never touches the server
    fn switch_database(&self, name: &str) -> Self::Db;
}

#[allow(async_fn_in_trait)]
pub trait DatabaseApi {
    fn name(&self) -> &str;

    async fn create_user(&self, user: &NewUser) -> Result<(), MongoErr>;

    async fn create_collection(&self, name: &str) -> Result<(), MongoErr>;
}

impl AdminApi for Client {
    type Db = Database;

    fn switch_database(&self, name: &str) -> Database {
        self.database(name)
    }
}

impl DatabaseApi for Database {
    fn name(&self) -> &str {
        Database::name(self)
    }

    #[instrument(skip_all, fields(db = Database::name(self), user = %user.name))]
    async fn create_user(&self, user: &NewUser) -> Result<(), MongoErr> {
        let roles = bson::to_bson(&user.roles)
            .map_err(|e| MongoErr::Other(format!("Unable to serialize roles: {e}")))?;

        let reply = self
            .run_command(doc! {
                "createUser": &user.name,
                "pwd": &user.password,
                "roles": roles,
            })
            .await
            .map_err(classify)?;

        debug!(?reply, "createUser acknowledged");

        Ok(())
    }

    #[instrument(skip(self), fields(db = Database::name(self)))]
    async fn create_collection(&self, name: &str) -> Result<(), MongoErr> {
        Database::create_collection(self, name)
            .await
            .map_err(classify)
    }
}
