use crate::admin::{AdminApi, DatabaseApi};
use crate::console::Console;
use crate::plan::BootstrapPlan;
use init_errors::{MongoErr, Step, StepErr};
use std::io::Write;
use tracing::{debug, info, instrument, warn};

pub const START_BANNER: &str = "=== DÉBUT INITIALISATION MONGODB AVEC AUTHENTIFICATION ===";
pub const END_BANNER: &str = "=== FIN INITIALISATION MONGODB ===";
const UNDEFINED_CODE: &str = "undefined";

#[derive(Debug)]
pub enum Outcome {
    Complete,
    /// Steps after the failing one did not run
    Aborted(StepErr),
}

impl Outcome {
    #[cfg(test)]
    pub(crate) fn is_complete(&self) -> bool {
        matches!(self, Outcome::Complete)
    }
}

#[derive(Debug)]
pub struct Bootstrapper<'a, A> {
    api: &'a A,
    plan: &'a BootstrapPlan,
}

impl<'a, A: AdminApi> Bootstrapper<'a, A> {
    pub fn new(api: &'a A, plan: &'a BootstrapPlan) -> Self {
        Self { api, plan }
    }

    /// Apply the plan and report to `console`
    ///
    /// Failures are reported, never returned: the closing banner is always written
    #[instrument(skip_all, fields(app_db = %self.plan.app_db))]
    pub async fn run<W: Write>(&self, console: &mut Console<W>) -> Outcome {
        console.line(START_BANNER);
        let res = self.apply(console).await;
        conclude(res, console)
    }

    async fn apply<W: Write>(&self, console: &mut Console<W>) -> Result<(), StepErr> {
        let plan = self.plan;

        let app_db = self.api.switch_database(&plan.app_db);
        debug!(step = %Step::SwitchToAppDb, db = app_db.name());

        console.line("Création de l'utilisateur applicatif...");
        app_db
            .create_user(&plan.app_user)
            .await
            .map_err(|e| StepErr::new(Step::CreateAppUser, e))?;
        info!(user = %plan.app_user.name, db = app_db.name(), "Created application user");
        console.line(format_args!(
            "✅ Utilisateur \"{}\" créé pour {}",
            plan.app_user.name, plan.app_db
        ));

        app_db
            .create_collection(&plan.collection)
            .await
            .map_err(|e| StepErr::new(Step::CreateCollection, e))?;
        info!(collection = %plan.collection, "Created collection");
        console.line(format_args!("✅ Collection {} créée", plan.collection));

        let admin_db = self.api.switch_database(&plan.admin_db);
        debug!(step = %Step::SwitchToAdminDb, db = admin_db.name());

        console.line("Création de l'administrateur principal...");
        admin_db
            .create_user(&plan.admin_user)
            .await
            .map_err(|e| StepErr::new(Step::CreateAdminUser, e))?;
        info!(user = %plan.admin_user.name, db = admin_db.name(), "Created admin user");
        console.line("✅ Administrateur principal créé");

        console.line("=== RÉSUMÉ DES UTILISATEURS CRÉÉS ===");
        console.line(format_args!(
            "1. {} ({}) : Utilisateur applicatif - Lecture/Écriture",
            plan.app_user.name, plan.app_db
        ));
        console.line(format_args!(
            "2. {} ({}) : Administrateur principal - Accès total",
            plan.admin_user.name, plan.admin_db
        ));

        Ok(())
    }
}

/// Like [`Bootstrapper::run`], but a failed connection is reported as the first failing step
#[instrument(skip_all, fields(app_db = %plan.app_db))]
pub async fn bootstrap<A: AdminApi, W: Write>(
    connection: Result<A, MongoErr>,
    plan: &BootstrapPlan,
    console: &mut Console<W>,
) -> Outcome {
    console.line(START_BANNER);
    let res = match connection {
        Ok(api) => Bootstrapper::new(&api, plan).apply(console).await,
        Err(e) => Err(StepErr::new(Step::Connect, e)),
    };
    conclude(res, console)
}

fn conclude<W: Write>(res: Result<(), StepErr>, console: &mut Console<W>) -> Outcome {
    let outcome = match res {
        Ok(()) => {
            info!("Bootstrap complete");
            Outcome::Complete
        }
        Err(e) => {
            warn!(step = %e.step, error = %e.source, "Bootstrap aborted");
            console.line(format_args!(
                "❌ ERREUR lors de l'initialisation: {}",
                e.source.message()
            ));
            console.line(format_args!("Code d'erreur: {}", render_code(e.source.code())));
            Outcome::Aborted(e)
        }
    };

    console.line(END_BANNER);

    outcome
}

fn render_code(code: Option<i32>) -> String {
    code.map_or_else(|| UNDEFINED_CODE.to_string(), |c| c.to_string())
}
