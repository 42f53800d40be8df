//! Database seeder for benefit backend development and testing.
//!
//! Seeds a company, an association, a handler, one applicant per employer,
//! and a draft application for each employer. Prints access tokens for the
//! seeded users.
//!
//! Usage: cargo run --bin seeder

use fake::{
    Fake,
    faker::{internet::en::SafeEmail, name::en::Name},
};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use benefit_core::application::{Address, CompanySnapshot};
use benefit_db::{ApplicationRepository, CompanyRepository, UserRepository};
use benefit_shared::jwt::JwtService;
use benefit_shared::{AppConfig, Role};

const HANDLER_EMAIL: &str = "handler@benefit.local";

struct SeedCompany {
    snapshot: CompanySnapshot,
    bank_account: &'static str,
}

fn seed_companies() -> Vec<SeedCompany> {
    vec![
        SeedCompany {
            snapshot: CompanySnapshot {
                name: "Testiyritys Oy".to_string(),
                business_id: "0877830-0".to_string(),
                company_form_code: 16,
                address: Address {
                    street_address: "Mannerheimintie 12".to_string(),
                    postcode: "00100".to_string(),
                    city: "Helsinki".to_string(),
                },
            },
            bank_account: "FI2112345600000785",
        },
        SeedCompany {
            snapshot: CompanySnapshot {
                name: "Kaupunkiyhdistys ry".to_string(),
                business_id: "1008663-7".to_string(),
                company_form_code: 29,
                address: Address {
                    street_address: "Hämeentie 3".to_string(),
                    postcode: "00530".to_string(),
                    city: "Helsinki".to_string(),
                },
            },
            bank_account: "FI5542345670000081",
        },
    ]
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    println!("Connecting to database...");
    let db = benefit_db::connect_with(&config.database)
        .await
        .expect("Failed to connect to database");
    let jwt = JwtService::new(&config.jwt);

    println!("Seeding handler...");
    let handler_id =
        seed_user(&db, HANDLER_EMAIL, "Kaisa Käsittelijä", Role::Handler, None).await;
    print_token(&jwt, "handler", handler_id, None, Role::Handler);

    for company in seed_companies() {
        println!("Seeding {}...", company.snapshot.name);
        let company_id = seed_company(&db, &company).await;

        let email: String = SafeEmail().fake();
        let name: String = Name().fake();
        let applicant_id = seed_user(&db, &email, &name, Role::Applicant, Some(company_id)).await;

        let application = ApplicationRepository::new(db.clone(), config.benefit.clone())
            .create(company_id)
            .await
            .expect("Failed to create draft application");
        println!(
            "  Draft application {} ({})",
            application.application_number, application.id
        );

        print_token(&jwt, &email, applicant_id, Some(company_id), Role::Applicant);
    }

    println!("Seeding complete!");
}

async fn seed_company(db: &DatabaseConnection, company: &SeedCompany) -> Uuid {
    let repo = CompanyRepository::new(db.clone());
    if let Some(existing) = repo
        .find_by_business_id(&company.snapshot.business_id)
        .await
        .expect("Failed to look up company")
    {
        println!("  Company already exists, skipping...");
        return existing.id;
    }

    repo.create(&company.snapshot, Some(company.bank_account))
        .await
        .expect("Failed to create company")
        .id
}

async fn seed_user(
    db: &DatabaseConnection,
    email: &str,
    full_name: &str,
    role: Role,
    company_id: Option<Uuid>,
) -> Uuid {
    let repo = UserRepository::new(db.clone());
    if let Some(existing) = repo
        .find_by_email(email)
        .await
        .expect("Failed to look up user")
    {
        println!("  User {email} already exists, skipping...");
        return existing.id;
    }

    repo.create(email, full_name, role, company_id)
        .await
        .expect("Failed to create user")
        .id
}

fn print_token(
    jwt: &JwtService,
    label: &str,
    user_id: Uuid,
    company_id: Option<Uuid>,
    role: Role,
) {
    let token = jwt
        .generate_access_token(user_id, company_id, role)
        .expect("Failed to sign token");
    println!("  {role} token for {label}:\n    {token}");
}
