//! Initial database migration.
//!
//! Creates enums, tables, and indexes for companies, applications, decision
//! batches, calculations, attachments, and the case system log.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: USERS & COMPANIES
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: DECISION BATCHES
        // ============================================================
        db.execute_unprepared(BATCHES_SQL).await?;

        // ============================================================
        // PART 4: APPLICATIONS
        // ============================================================
        db.execute_unprepared(APPLICATIONS_SQL).await?;
        db.execute_unprepared(APPLICATION_LOG_SQL).await?;

        // ============================================================
        // PART 5: CALCULATIONS
        // ============================================================
        db.execute_unprepared(CALCULATIONS_SQL).await?;

        // ============================================================
        // PART 6: ATTACHMENTS
        // ============================================================
        db.execute_unprepared(ATTACHMENTS_SQL).await?;

        // ============================================================
        // PART 7: CASE SYSTEM & AUDIT
        // ============================================================
        db.execute_unprepared(CASE_SYSTEM_SQL).await?;
        db.execute_unprepared(AUDIT_LOG_SQL).await?;

        // ============================================================
        // PART 8: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('handler', 'applicant');

CREATE TYPE application_status AS ENUM (
    'draft',
    'received',
    'handling',
    'additional_information_needed',
    'cancelled',
    'accepted',
    'rejected'
);

CREATE TYPE batch_status AS ENUM (
    'draft',
    'report_created',
    'awaiting_decision',
    'accepted',
    'rejected',
    'returned',
    'sent_to_payment_system',
    'completed'
);

CREATE TYPE batch_decision AS ENUM ('accepted', 'rejected');

CREATE TYPE attachment_type AS ENUM (
    'employment_contract',
    'pay_subsidy_decision',
    'commission_contract',
    'education_contract',
    'helsinki_benefit_voucher',
    'employee_consent',
    'full_application',
    'other_attachment'
);

CREATE TYPE case_system_status AS ENUM (
    'submitted_but_not_sent',
    'request_to_open_case_sent',
    'case_opened',
    'decision_proposal_sent',
    'details_received'
);
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    business_id VARCHAR(16) NOT NULL UNIQUE,
    company_form_code INTEGER NOT NULL,
    street_address VARCHAR(255) NOT NULL DEFAULT '',
    postcode VARCHAR(10) NOT NULL DEFAULT '',
    city VARCHAR(64) NOT NULL DEFAULT '',
    bank_account_number VARCHAR(34),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    role user_role NOT NULL,
    company_id UUID REFERENCES companies(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_applicant_company CHECK (role = 'handler' OR company_id IS NOT NULL)
);
";

const BATCHES_SQL: &str = r"
CREATE TABLE application_batches (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    status batch_status NOT NULL DEFAULT 'draft',
    proposal_for_decision batch_decision NOT NULL,
    handler_id UUID REFERENCES users(id),
    decision_maker_title VARCHAR(255),
    decision_maker_name VARCHAR(255),
    section_of_the_law VARCHAR(16),
    decision_date DATE,
    expert_inspector_name VARCHAR(128),
    expert_inspector_title VARCHAR(64),
    p2p_inspector_name VARCHAR(128),
    p2p_inspector_email VARCHAR(254),
    p2p_checker_name VARCHAR(128),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- One open draft per proposal
CREATE UNIQUE INDEX uq_batches_single_draft
    ON application_batches(proposal_for_decision)
    WHERE status = 'draft';

CREATE INDEX idx_batches_status ON application_batches(status);
";

const APPLICATIONS_SQL: &str = r"
CREATE SEQUENCE application_number_seq START 125000;

CREATE TABLE applications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    application_number INTEGER NOT NULL UNIQUE DEFAULT nextval('application_number_seq'),
    status application_status NOT NULL DEFAULT 'draft',
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE RESTRICT,
    company_name VARCHAR(255) NOT NULL,
    company_business_id VARCHAR(16) NOT NULL,
    company_form_code INTEGER NOT NULL,
    company_street_address VARCHAR(255) NOT NULL,
    company_postcode VARCHAR(10) NOT NULL,
    company_city VARCHAR(64) NOT NULL,
    fields JSONB NOT NULL DEFAULT '{}'::jsonb,
    handler_id UUID REFERENCES users(id),
    batch_id UUID REFERENCES application_batches(id) ON DELETE SET NULL,
    archived BOOLEAN NOT NULL DEFAULT false,
    calculated_benefit_amount NUMERIC(12, 2),
    manual_benefit_amount NUMERIC(12, 2),
    case_id VARCHAR(64),
    case_guid UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

ALTER SEQUENCE application_number_seq OWNED BY applications.application_number;

CREATE INDEX idx_applications_company ON applications(company_id);
CREATE INDEX idx_applications_status ON applications(status);
CREATE INDEX idx_applications_batch ON applications(batch_id) WHERE batch_id IS NOT NULL;
";

const APPLICATION_LOG_SQL: &str = r"
CREATE TABLE application_log_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    application_id UUID NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
    from_status application_status NOT NULL,
    to_status application_status NOT NULL,
    actor VARCHAR(16) NOT NULL,
    comment TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_log_entries_application ON application_log_entries(application_id, created_at);
";

const CALCULATIONS_SQL: &str = r"
CREATE TABLE calculations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    application_id UUID NOT NULL UNIQUE REFERENCES applications(id) ON DELETE CASCADE,
    benefit_type VARCHAR(16) NOT NULL,
    start_date DATE,
    end_date DATE,
    monthly_pay NUMERIC(12, 2) NOT NULL DEFAULT 0,
    vacation_money NUMERIC(12, 2) NOT NULL DEFAULT 0,
    other_expenses NUMERIC(12, 2) NOT NULL DEFAULT 0,
    state_aid_max_percentage NUMERIC(5, 2) NOT NULL DEFAULT 100,
    granted_as_de_minimis_aid BOOLEAN NOT NULL DEFAULT false,
    target_group_check BOOLEAN NOT NULL DEFAULT false,
    calculated_benefit_amount NUMERIC(12, 2),
    override_monthly_benefit_amount NUMERIC(12, 2),
    override_monthly_benefit_amount_comment TEXT,
    duration_in_months_rounded NUMERIC(6, 2),
    handler_id UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE calculation_rows (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    calculation_id UUID NOT NULL REFERENCES calculations(id) ON DELETE CASCADE,
    ordinal INTEGER NOT NULL,
    row_type VARCHAR(64) NOT NULL,
    description_fi TEXT NOT NULL,
    amount NUMERIC(12, 2) NOT NULL,
    start_date DATE,
    end_date DATE,
    UNIQUE (calculation_id, ordinal)
);

CREATE TABLE pay_subsidies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    application_id UUID NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
    ordinal INTEGER NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    pay_subsidy_percent INTEGER NOT NULL,
    work_time_percent NUMERIC(5, 2) NOT NULL DEFAULT 100,
    disability_or_illness BOOLEAN NOT NULL DEFAULT false,
    CONSTRAINT chk_pay_subsidy_dates CHECK (end_date >= start_date)
);

CREATE TABLE training_compensations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    application_id UUID NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
    ordinal INTEGER NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    monthly_amount NUMERIC(12, 2) NOT NULL,
    CONSTRAINT chk_training_dates CHECK (end_date >= start_date)
);

CREATE INDEX idx_pay_subsidies_application ON pay_subsidies(application_id);
CREATE INDEX idx_training_application ON training_compensations(application_id);
";

const ATTACHMENTS_SQL: &str = r"
CREATE TABLE attachments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    application_id UUID NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
    attachment_type attachment_type NOT NULL,
    file_name VARCHAR(255) NOT NULL,
    content_type VARCHAR(100) NOT NULL,
    file_size BIGINT NOT NULL,
    storage_key VARCHAR(500) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_file_size CHECK (file_size > 0)
);

CREATE INDEX idx_attachments_application ON attachments(application_id);
";

const CASE_SYSTEM_SQL: &str = r"
CREATE TABLE case_system_statuses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    application_id UUID NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
    status case_system_status NOT NULL,
    request_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_case_statuses_application ON case_system_statuses(application_id, created_at);
";

const AUDIT_LOG_SQL: &str = r"
CREATE TABLE audit_log_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    actor VARCHAR(64) NOT NULL,
    operation VARCHAR(32) NOT NULL,
    target_type VARCHAR(64) NOT NULL,
    target_id UUID NOT NULL,
    details JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_audit_target ON audit_log_entries(target_type, target_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: touch_updated_at
-- Keeps updated_at current on every update
-- ============================================================
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_companies_updated_at
    BEFORE UPDATE ON companies
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_users_updated_at
    BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_batches_updated_at
    BEFORE UPDATE ON application_batches
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_applications_updated_at
    BEFORE UPDATE ON applications
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_calculations_updated_at
    BEFORE UPDATE ON calculations
    FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";

const DROP_ALL_SQL: &str = r"
-- Drop tables in reverse dependency order
DROP TABLE IF EXISTS audit_log_entries CASCADE;
DROP TABLE IF EXISTS case_system_statuses CASCADE;
DROP TABLE IF EXISTS attachments CASCADE;
DROP TABLE IF EXISTS training_compensations CASCADE;
DROP TABLE IF EXISTS pay_subsidies CASCADE;
DROP TABLE IF EXISTS calculation_rows CASCADE;
DROP TABLE IF EXISTS calculations CASCADE;
DROP TABLE IF EXISTS application_log_entries CASCADE;
DROP TABLE IF EXISTS applications CASCADE;
DROP TABLE IF EXISTS application_batches CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS companies CASCADE;

DROP FUNCTION IF EXISTS touch_updated_at() CASCADE;

-- Drop enums
DROP TYPE IF EXISTS case_system_status CASCADE;
DROP TYPE IF EXISTS attachment_type CASCADE;
DROP TYPE IF EXISTS batch_decision CASCADE;
DROP TYPE IF EXISTS batch_status CASCADE;
DROP TYPE IF EXISTS application_status CASCADE;
DROP TYPE IF EXISTS user_role CASCADE;
";
