//! Built-in rule catalogue for census-style and clinical quasi-identifiers.
//!
//! Hierarchy tables are built once and shared; every constructor returns a cheap clone.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::rule::{Bands, GeneralizationRule, Hierarchy, RangeBuckets};

/// Marker used by source datasets for an unknown value.
pub const UNKNOWN: &str = "?";

const UNKNOWN_GROUP: (&str, &[&str]) = (UNKNOWN, &[UNKNOWN]);

static COUNTRY: Lazy<Arc<Hierarchy>> = Lazy::new(|| {
    const SOUTH_AMERICA: &[&str] = &["Columbia", "Peru", "Ecuador", "Trinadad&Tobago"];
    const NORTH_AMERICA: &[&str] = &["United-States", "Canada", "Mexico"];
    const CENTRAL_AMERICA: &[&str] = &[
        "Puerto-Rico",
        "Jamaica",
        "Guatemala",
        "El-Salvador",
        "Cuba",
        "Dominican-Republic",
        "Haiti",
        "Honduras",
        "Nicaragua",
    ];
    const EASTERN_EUROPE: &[&str] = &["Hungary", "Yugoslavia", "Poland"];
    const SOUTHERN_EUROPE: &[&str] = &["Greece", "Portugal", "Italy"];
    const WESTERN_EUROPE: &[&str] = &[
        "Scotland",
        "Germany",
        "Ireland",
        "England",
        "Holand-Netherlands",
        "France",
    ];
    const SOUTHERN_AFRICA: &[&str] = &["South"];
    const EAST_ASIA: &[&str] = &[
        "China",
        "Japan",
        "Thailand",
        "Cambodia",
        "Philippines",
        "Taiwan",
        "India",
        "Hong",
        "Vietnam",
        "Laos",
        "Outlying-US(Guam-USVI-etc)",
    ];
    const MIDDLE_EAST: &[&str] = &["Iran"];

    let america = [SOUTH_AMERICA, NORTH_AMERICA, CENTRAL_AMERICA].concat();
    let europe = [EASTERN_EUROPE, SOUTHERN_EUROPE, WESTERN_EUROPE].concat();
    let asia = [EAST_ASIA, MIDDLE_EAST].concat();

    Arc::new(
        Hierarchy::new("country", "World")
            .level(&[
                UNKNOWN_GROUP,
                ("South-America", SOUTH_AMERICA),
                ("North-America", NORTH_AMERICA),
                ("Central-America", CENTRAL_AMERICA),
                ("Eastern-Europe", EASTERN_EUROPE),
                ("Southern-Europe", SOUTHERN_EUROPE),
                ("Western-Europe", WESTERN_EUROPE),
                ("Southern-Africa", SOUTHERN_AFRICA),
                ("East-Asia", EAST_ASIA),
                ("Middle-East", MIDDLE_EAST),
            ])
            .level(&[
                UNKNOWN_GROUP,
                ("America", america.as_slice()),
                ("Europe", europe.as_slice()),
                ("Africa", SOUTHERN_AFRICA),
                ("Asia", asia.as_slice()),
            ]),
    )
});

static OCCUPATION: Lazy<Arc<Hierarchy>> = Lazy::new(|| {
    Arc::new(Hierarchy::new("occupation", "Profession").level(&[
        UNKNOWN_GROUP,
        (
            "Tertiary-Sector",
            &[
                "Tech-support",
                "Exec-managerial",
                "Adm-clerical",
                "Handlers-cleaners",
                "Other-service",
                "Prof-specialty",
                "Priv-house-serv",
                "Protective-serv",
                "Armed-Forces",
            ],
        ),
        ("Secondary-Sector", &["Craft-repair", "Machine-op-inspct", "Sales"]),
        ("Primary-Sector", &["Farming-fishing", "Transport-moving"]),
    ]))
});

static EDUCATION: Lazy<Arc<Hierarchy>> = Lazy::new(|| {
    Arc::new(Hierarchy::new("education", "Instruction").level(&[
        UNKNOWN_GROUP,
        ("College", &["Some-college", "Bachelors", "Masters", "Doctorate"]),
        ("High-School", &["HS-grad", "9th", "10th", "11th", "12th"]),
        ("Middle-School", &["7th-8th", "5th-6th"]),
        ("Elementary-School", &["1st-4th", "Preschool"]),
        ("Professional-Dev", &["Prof-school", "Assoc-acdm", "Assoc-voc"]),
    ]))
});

static MARITAL_STATUS: Lazy<Arc<Hierarchy>> = Lazy::new(|| {
    Arc::new(Hierarchy::new("marital_status", "Human").level(&[
        UNKNOWN_GROUP,
        (
            "Has-Spouse",
            &["Married-civ-spouse", "Married-AF-spouse", "Married-spouse-absent"],
        ),
        ("Had-Spouse", &["Divorced", "Separated", "Widowed"]),
        ("No-Spouse", &["Never-married"]),
    ]))
});

static WORKCLASS: Lazy<Arc<Hierarchy>> = Lazy::new(|| {
    Arc::new(Hierarchy::new("workclass", "Workforce").level(&[
        UNKNOWN_GROUP,
        ("Self-Employed", &["Self-emp-not-inc", "Self-emp-inc"]),
        ("Government", &["Federal-gov", "Local-gov", "State-gov"]),
        ("Not-Employed", &["Without-pay", "Never-worked"]),
        ("Private", &["Private"]),
    ]))
});

static RELATIONSHIP: Lazy<Arc<Hierarchy>> = Lazy::new(|| {
    Arc::new(Hierarchy::new("relationship", "Relationship").level(&[
        (
            "Family",
            &["Wife", "Own-child", "Husband", "Other-relative", "Unmarried"],
        ),
        ("Alone", &["Not-in-family"]),
    ]))
});

static GENDER: Lazy<Arc<Hierarchy>> = Lazy::new(|| {
    Arc::new(Hierarchy::new("gender", "Unknown").domain(&["Male", "Female", "Other"]))
});

static INSURANCE: Lazy<Arc<Hierarchy>> = Lazy::new(|| {
    Arc::new(Hierarchy::new("insurance", "Insurance").level(&[
        UNKNOWN_GROUP,
        ("Not Public", &["Private", "Self Pay"]),
        ("Public", &["Medicare", "Medicaid", "Government"]),
    ]))
});

static CLINICAL_MARITAL_STATUS: Lazy<Arc<Hierarchy>> = Lazy::new(|| {
    Arc::new(Hierarchy::new("clinical_marital_status", "Marital status").level(&[
        (UNKNOWN, &[UNKNOWN, "UNKNOWN (DEFAULT)"]),
        ("HAS PARTNER", &["MARRIED", "LIFE PARTNER"]),
        ("NO PARTNER", &["SINGLE", "DIVORCED", "WIDOWED", "SEPARATED"]),
    ]))
});

static BIRTH_YEAR: Lazy<Arc<Bands>> = Lazy::new(|| {
    Arc::new(Bands {
        name: "birth_year".into(),
        bands: vec![
            (1950, "quite old".into()),
            (1980, "a bit old".into()),
            (2000, "young".into()),
        ],
        overflow: "very young".into(),
        top: "dob".into(),
    })
});

/// Ages 0..=129 bucketed into widths 1, 10, 50 and 130.
pub fn age() -> GeneralizationRule {
    GeneralizationRule::NumericRange(RangeBuckets {
        name: "age".into(),
        min: 0,
        max: 129,
        widths: vec![1, 10, 50, 130],
    })
}

/// Country → region → continent → `World`.
pub fn country() -> GeneralizationRule {
    GeneralizationRule::Hierarchy(COUNTRY.clone())
}

pub fn occupation() -> GeneralizationRule {
    GeneralizationRule::Hierarchy(OCCUPATION.clone())
}

pub fn education() -> GeneralizationRule {
    GeneralizationRule::Hierarchy(EDUCATION.clone())
}

pub fn marital_status() -> GeneralizationRule {
    GeneralizationRule::Hierarchy(MARITAL_STATUS.clone())
}

pub fn workclass() -> GeneralizationRule {
    GeneralizationRule::Hierarchy(WORKCLASS.clone())
}

pub fn relationship() -> GeneralizationRule {
    GeneralizationRule::Hierarchy(RELATIONSHIP.clone())
}

/// Gender (`Male`, `Female`, `Other`) collapses straight to `Unknown`.
pub fn gender() -> GeneralizationRule {
    GeneralizationRule::Hierarchy(GENDER.clone())
}

pub fn insurance() -> GeneralizationRule {
    GeneralizationRule::Hierarchy(INSURANCE.clone())
}

/// Marital status as recorded in clinical admissions data.
pub fn clinical_marital_status() -> GeneralizationRule {
    GeneralizationRule::Hierarchy(CLINICAL_MARITAL_STATUS.clone())
}

pub fn birth_year() -> GeneralizationRule {
    GeneralizationRule::Bands(BIRTH_YEAR.clone())
}

/// ICD-9 procedure code: first character, then `proc`.
pub fn icd_procedure() -> GeneralizationRule {
    GeneralizationRule::Prefix {
        name: "icd_procedure",
        keep: 1,
        top: "proc",
    }
}

pub fn suppress() -> GeneralizationRule {
    GeneralizationRule::Suppress
}
