// Reference columns are unconstrained NUMERIC so uploads keep full precision;
// only results are stored at two places, after rounding.

/// City standards: one row per (city_name, year), replaced wholesale per year.
pub const CITIES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS si.cities (
    id BIGSERIAL PRIMARY KEY,
    city_name TEXT NOT NULL,
    year VARCHAR(4) NOT NULL,
    base_min NUMERIC NOT NULL,
    base_max NUMERIC NOT NULL,
    rate NUMERIC NOT NULL,

    CONSTRAINT chk_cities_band CHECK (base_min <= base_max),
    CONSTRAINT chk_cities_rate CHECK (rate >= 0 AND rate <= 1)
);

CREATE INDEX IF NOT EXISTS idx_cities_city_year ON si.cities(city_name, year);
CREATE INDEX IF NOT EXISTS idx_cities_year ON si.cities(year);
"#;

/// Monthly salary rows; `month` is `YYYYMM` so prefix and range filters stay lexical.
pub const SALARIES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS si.salaries (
    id BIGSERIAL PRIMARY KEY,
    employee_id TEXT NOT NULL,
    employee_name TEXT NOT NULL,
    month VARCHAR(6) NOT NULL,
    salary_amount NUMERIC NOT NULL,

    CONSTRAINT chk_salaries_amount CHECK (salary_amount >= 0)
);

CREATE INDEX IF NOT EXISTS idx_salaries_month ON si.salaries(month text_pattern_ops);
"#;

/// Append-only calculation results.
pub const RESULTS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS si.results (
    id BIGSERIAL PRIMARY KEY,
    employee_name TEXT NOT NULL,
    avg_salary NUMERIC(14, 2) NOT NULL,
    contribution_base NUMERIC(14, 2) NOT NULL,
    company_fee NUMERIC(14, 2) NOT NULL,
    calculation_year VARCHAR(4),
    calculation_month VARCHAR(5),
    city_name TEXT,
    run_id VARCHAR(26),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_results_created_at ON si.results(created_at DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_results_run_id ON si.results(run_id);
"#;
