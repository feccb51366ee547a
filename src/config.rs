// src/config.rs
//
// Estado compartilhado da aplicação. Aqui montamos o grafo de dependências
// inteiro: pool do Postgres, repositórios, serviços e o notificador. Os
// handlers só enxergam o AppState.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{
        pg::{
            PgAppointmentRepository, PgAuditItemRepository, PgDashboardRepository,
            PgPaymentRepository, PgReportRepository, PgUserRepository,
        },
        AppointmentStore, AuditItemStore, MemoryStore, PaymentStore, ReportStore, StatsStore,
        UserStore,
    },
    services::{
        appointment_service::AppointmentService,
        audit_service::AuditService,
        auth::AuthService,
        notifications::{EmailNotifier, NotificationSender},
        pdf_service::PdfService,
        report_service::ReportService,
    },
};

/// Conjunto de repositórios por trás dos serviços. Em produção todos apontam
/// para o mesmo pool Postgres; nos testes, para um único MemoryStore.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub items: Arc<dyn AuditItemStore>,
    pub reports: Arc<dyn ReportStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub stats: Arc<dyn StatsStore>,
}

impl Stores {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            appointments: Arc::new(PgAppointmentRepository::new(pool.clone())),
            items: Arc::new(PgAuditItemRepository::new(pool.clone())),
            reports: Arc::new(PgReportRepository::new(pool.clone())),
            payments: Arc::new(PgPaymentRepository::new(pool.clone())),
            stats: Arc::new(PgDashboardRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            appointments: Arc::new(store.clone()),
            items: Arc::new(store.clone()),
            reports: Arc::new(store.clone()),
            payments: Arc::new(store.clone()),
            stats: Arc::new(store),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub appointment_service: AppointmentService,
    pub audit_service: AuditService,
    pub report_service: ReportService,
    pub users: Arc<dyn UserStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub stats: Arc<dyn StatsStore>,
    pub notifier: Arc<dyn NotificationSender>,
}

impl AppState {
    /// Constrói o estado de produção a partir das variáveis de ambiente.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL não definida no ambiente")?;
        let jwt_secret =
            std::env::var("JWT_SECRET").context("JWT_SECRET não definida no ambiente")?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await
            .context("falha ao conectar no Postgres")?;
        tracing::info!("✅ Conexão com o banco de dados estabelecida!");

        sqlx::migrate!()
            .run(&pool)
            .await
            .context("falha ao rodar as migrações")?;
        tracing::info!("✅ Migrações aplicadas com sucesso!");

        let notifier: Arc<dyn NotificationSender> = Arc::new(EmailNotifier::new());
        Ok(Self::with_stores(Stores::postgres(pool), notifier, jwt_secret))
    }

    /// Monta o grafo de serviços sobre um conjunto de stores arbitrário.
    /// Os testes de integração entram por aqui com stores em memória.
    pub fn with_stores(
        stores: Stores,
        notifier: Arc<dyn NotificationSender>,
        jwt_secret: String,
    ) -> Self {
        let auth_service = AuthService::new(stores.users.clone(), jwt_secret);
        let appointment_service = AppointmentService::new(
            stores.appointments.clone(),
            stores.users.clone(),
            notifier.clone(),
        );
        let audit_service =
            AuditService::new(stores.items.clone(), stores.appointments.clone());
        let report_service = ReportService::new(
            stores.reports.clone(),
            stores.items.clone(),
            stores.appointments.clone(),
            stores.users.clone(),
            Arc::new(PdfService::new()),
            notifier.clone(),
        );

        Self {
            auth_service,
            appointment_service,
            audit_service,
            report_service,
            users: stores.users,
            appointments: stores.appointments,
            payments: stores.payments,
            stats: stores.stats,
            notifier,
        }
    }
}
