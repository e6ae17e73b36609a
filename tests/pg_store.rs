//! Testes do `PgStore` contra um Postgres real: migrações, papel
//! `imobras_app`, função `has_role` e as policies RLS dono-ou-admin.
//!
//! Só rodam com `DATABASE_URL` definida; sem ela cada teste termina cedo.
//! Os dados não são apagados entre execuções, então cada teste cria
//! identidades com e-mail único e confere apenas os próprios ids.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use imobras::{
    common::error::AppError,
    db::{
        ContractRepository, ExpenseRepository, IdentityRepository, PgStore, RevenueRepository,
        RoleRepository,
    },
    models::{
        contract::{ContractFields, LeasePeriod, Party, Property},
        finance::{ExpenseFields, ExpenseStatus, PeriodFilter, RevenueFields, RevenueType},
        rbac::AppRole,
    },
};

async fn pg_store() -> Option<PgStore> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("pulando testes do PgStore: DATABASE_URL não definida");
        return None;
    };
    Some(PgStore::connect(&url).await.expect("conexão com o Postgres de teste"))
}

async fn identity(store: &PgStore, role: AppRole) -> Uuid {
    let email = format!("teste-{}@imobras.com.br", Uuid::new_v4());
    let id = store.insert_identity(&email, "hash", "Fulano").await.unwrap().id;
    store.assign_initial_role(id, role).await.unwrap();
    id
}

fn contract(name: &str) -> ContractFields {
    ContractFields {
        name: name.into(),
        owner: Party {
            name: "Carlos Pereira".into(),
            document: "123.456.789-00".into(),
        },
        tenant: Party {
            name: "Ana Lima".into(),
            document: "987.654.321-00".into(),
        },
        property: Property {
            address: "Rua das Flores, 123".into(),
            iptu: "000.123.4567-8".into(),
            due_day: 10,
        },
        period: LeasePeriod {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        },
        rent_value: Decimal::new(2500_00, 2),
        iptu_value: Decimal::new(180_00, 2),
        admin_fee_percentage: Decimal::new(10_00, 2),
    }
}

fn expense(value: Decimal) -> ExpenseFields {
    ExpenseFields {
        description: "Condomínio".into(),
        value,
        due_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
        status: ExpenseStatus::Pending,
        bank: "Banco do Brasil".into(),
        payment_method: "Boleto".into(),
    }
}

#[tokio::test]
async fn plain_user_lists_only_own_contracts() {
    let Some(store) = pg_store().await else { return };
    let ana = identity(&store, AppRole::User).await;
    let bia = identity(&store, AppRole::User).await;

    let own = store.insert_contract(ana, &contract("Apto 101")).await.unwrap();
    let foreign = store.insert_contract(bia, &contract("Sala 2")).await.unwrap();

    let listed: Vec<Uuid> = store.list_contracts(ana).await.unwrap().iter().map(|c| c.id).collect();
    assert!(listed.contains(&own.id));
    assert!(!listed.contains(&foreign.id));

    assert!(store.find_contract(ana, foreign.id).await.unwrap().is_none());
}

#[tokio::test]
async fn admin_lists_every_contract() {
    let Some(store) = pg_store().await else { return };
    let boss = identity(&store, AppRole::Admin).await;
    let ana = identity(&store, AppRole::User).await;

    let foreign = store.insert_contract(ana, &contract("Apto 101")).await.unwrap();

    let listed: Vec<Uuid> = store.list_contracts(boss).await.unwrap().iter().map(|c| c.id).collect();
    assert!(listed.contains(&foreign.id));
    assert!(store.find_contract(boss, foreign.id).await.unwrap().is_some());
}

#[tokio::test]
async fn plain_user_cannot_grant_roles() {
    let Some(store) = pg_store().await else { return };
    let ana = identity(&store, AppRole::User).await;
    let bia = identity(&store, AppRole::User).await;

    let err = store.grant_role(ana, bia, AppRole::Admin).await.unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied), "{err:?}");

    let roles = store.roles_of(bia).await.unwrap();
    assert!(roles.iter().all(|r| r.role == AppRole::User));
}

#[tokio::test]
async fn admin_grant_is_a_set_union() {
    let Some(store) = pg_store().await else { return };
    let boss = identity(&store, AppRole::Admin).await;
    let ana = identity(&store, AppRole::User).await;

    let first = store.grant_role(boss, ana, AppRole::Admin).await.unwrap();
    let second = store.grant_role(boss, ana, AppRole::Admin).await.unwrap();
    assert_eq!(first.id, second.id);

    assert_eq!(store.revoke_role(boss, ana, AppRole::Admin).await.unwrap(), 1);
}

#[tokio::test]
async fn invisible_rows_act_as_missing() {
    let Some(store) = pg_store().await else { return };
    let ana = identity(&store, AppRole::User).await;
    let bia = identity(&store, AppRole::User).await;

    let bill = store.insert_expense(bia, &expense(Decimal::new(400_00, 2))).await.unwrap();
    let lease = store.insert_contract(bia, &contract("Sala 2")).await.unwrap();
    let revenue = store
        .insert_revenue(
            bia,
            &RevenueFields {
                contract_id: lease.id,
                kind: RevenueType::Location,
                value: Decimal::new(2500_00, 2),
                month: 3,
                year: 2025,
            },
        )
        .await
        .unwrap();

    assert!(store.toggle_expense_status(ana, bill.id).await.unwrap().is_none());
    assert!(!store.delete_expense(ana, bill.id).await.unwrap());
    assert!(!store.delete_contract(ana, lease.id).await.unwrap());
    assert!(!store.delete_revenue(ana, revenue.id).await.unwrap());

    // Nada mudou para a dona
    let kept = store.find_expense(bia, bill.id).await.unwrap().unwrap();
    assert_eq!(kept.status, ExpenseStatus::Pending);
    let filter = PeriodFilter { month: Some(3), year: Some(2025) };
    assert!(store.list_revenues(bia, filter).await.unwrap().iter().any(|r| r.id == revenue.id));
}

#[tokio::test]
async fn admin_toggles_foreign_expense() {
    let Some(store) = pg_store().await else { return };
    let boss = identity(&store, AppRole::Admin).await;
    let ana = identity(&store, AppRole::User).await;

    let bill = store.insert_expense(ana, &expense(Decimal::new(400_00, 2))).await.unwrap();
    let toggled = store.toggle_expense_status(boss, bill.id).await.unwrap().unwrap();
    assert_eq!(toggled.status, ExpenseStatus::Paid);
    assert_eq!((toggled.month, toggled.year), (3, 2025));
}

#[tokio::test]
async fn values_beyond_the_column_are_client_errors() {
    let Some(store) = pg_store().await else { return };
    let ana = identity(&store, AppRole::User).await;

    let err = store
        .insert_expense(ana, &expense(Decimal::from(10_000_000_000_000_i64)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValueOutOfRange), "{err:?}");
}
