use booklib_core::db::open_db_in_memory;
use booklib_core::model::customer::{
    AGE_MAX, APP_NO_MAX_CHARS, CITY_MAX_CHARS, NAME_MAX_CHARS, PESEL_MAX_CHARS, STREET_MAX_CHARS,
};
use booklib_core::{
    Customer, CustomerField, CustomerFilter, CustomerRepository, CustomerSession,
    CustomerValidationError, SqliteCustomerRepository,
};
use proptest::prelude::*;

#[test]
fn new_customer_is_transient() {
    let customer = Customer::new(
        "Jan Kowalski",
        "Warszawa",
        35,
        "85010212345",
        "Aleje Jerozolimskie 10",
        "PL001",
    )
    .unwrap();

    assert_eq!(customer.id(), None);
    assert!(!customer.is_persisted());
    assert_eq!(customer.app_no, "PL001");
    customer.validate().unwrap();
}

#[test]
fn blank_fields_are_rejected() {
    let cases = [
        (CustomerField::Name, Customer::new("", "Łódź", 35, "85010212345", "Piotrkowska 100", "PL001")),
        (CustomerField::City, Customer::new("Ewa Malinowska", "  ", 28, "92120456789", "Lipowa 3", "PL002")),
        (CustomerField::Pesel, Customer::new("Agata Kowalczyk", "Lublin", 40, "", "Zamojska 25", "PL004")),
        (CustomerField::Street, Customer::new("Dariusz Więckowski", "Białystok", 29, "90010123456", "\t", "PL005")),
        (CustomerField::AppNo, Customer::new("Dariusz Więckowski", "Białystok", 29, "90010123456", "Groove Street", "")),
    ];

    for (field, result) in cases {
        assert_eq!(result.unwrap_err(), CustomerValidationError::BlankField(field));
    }
}

#[test]
fn age_outside_range_is_rejected() {
    let negative = Customer::new("Zofia Nowak", "Katowice", -1, "12345678901", "Uliczna 2", "PL006");
    assert_eq!(
        negative.unwrap_err(),
        CustomerValidationError::AgeOutOfRange { age: -1 }
    );

    let too_old = Customer::new("Zofia Nowak", "Katowice", AGE_MAX + 1, "12345678901", "Uliczna 2", "PL006");
    assert!(matches!(
        too_old.unwrap_err(),
        CustomerValidationError::AgeOutOfRange { .. }
    ));

    Customer::new("Zofia Nowak", "Katowice", 0, "12345678901", "Uliczna 2", "PL006").unwrap();
    Customer::new("Zofia Nowak", "Katowice", AGE_MAX, "12345678901", "Uliczna 2", "PL006").unwrap();
}

#[test]
fn extreme_length_values_are_rejected() {
    let huge = |c: char| c.to_string().repeat(1_000_000);
    let cases = [
        (CustomerField::Pesel, Customer::new("Rafal", "Warszawa", 30, huge('1'), "S", "PL1")),
        (CustomerField::Name, Customer::new(huge('R'), "Warszawa", 30, "12345678901", "S", "PL1")),
        (CustomerField::City, Customer::new("Rafal", huge('W'), 30, "12345678901", "S", "PL1")),
        (CustomerField::Street, Customer::new("Rafal", "Warszawa", 30, "12345678901", huge('S'), "PL1")),
        (CustomerField::AppNo, Customer::new("Rafal", "Warszawa", 30, "12345678901", "S", huge('P'))),
    ];

    for (field, result) in cases {
        match result.unwrap_err() {
            CustomerValidationError::FieldTooLong {
                field: rejected,
                actual_chars,
                ..
            } => {
                assert_eq!(rejected, field);
                assert_eq!(actual_chars, 1_000_000);
            }
            other => panic!("unexpected error for {field}: {other}"),
        }
    }
}

#[test]
fn limits_are_measured_in_characters() {
    let name = "Ł".repeat(NAME_MAX_CHARS);
    let city = "ś".repeat(CITY_MAX_CHARS);
    let pesel = "1".repeat(PESEL_MAX_CHARS);
    let street = "ż".repeat(STREET_MAX_CHARS);
    let app_no = "P".repeat(APP_NO_MAX_CHARS);
    Customer::new(name, city, 30, pesel, street, app_no).unwrap();

    let err = Customer::new("Rafal", "Warszawa", 30, "1", "S", "PL12345678X").unwrap_err();
    assert_eq!(
        err,
        CustomerValidationError::FieldTooLong {
            field: CustomerField::AppNo,
            max_chars: APP_NO_MAX_CHARS,
            actual_chars: 11,
        }
    );
    assert_eq!(err.to_string(), "appNo exceeds 10 characters (got 11)");
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let customer = Customer::new("Anna Nowak", "Kraków", 28, "92120456789", "Wawelska 22", "PL002")
        .unwrap();

    let json = serde_json::to_value(&customer).unwrap();
    assert_eq!(json["id"], serde_json::Value::Null);
    assert_eq!(json["name"], "Anna Nowak");
    assert_eq!(json["age"], 28);
    assert_eq!(json["appNo"], "PL002");
    assert!(json.get("app_no").is_none());

    let decoded: Customer = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, customer);
}

#[test]
fn deserialization_rejects_null_and_wrong_typed_fields() {
    let base = serde_json::json!({
        "name": "Zofia Nowak",
        "city": "Katowice",
        "age": 25,
        "pesel": "12345678901",
        "street": "Uliczna 2",
        "appNo": "PL006"
    });
    serde_json::from_value::<Customer>(base.clone()).unwrap();

    for key in ["name", "city", "age", "pesel", "street", "appNo"] {
        let mut nulled = base.clone();
        nulled[key] = serde_json::Value::Null;
        assert!(
            serde_json::from_value::<Customer>(nulled).is_err(),
            "null {key} must be rejected"
        );

        let mut missing = base.clone();
        missing.as_object_mut().unwrap().remove(key);
        assert!(
            serde_json::from_value::<Customer>(missing).is_err(),
            "missing {key} must be rejected"
        );
    }

    for key in ["name", "city", "pesel", "street", "appNo"] {
        let mut wrong = base.clone();
        wrong[key] = serde_json::json!(1);
        assert!(serde_json::from_value::<Customer>(wrong).is_err());
    }

    let mut wrong_age = base.clone();
    wrong_age["age"] = serde_json::json!("25");
    assert!(serde_json::from_value::<Customer>(wrong_age).is_err());

    let mut negative_age = base;
    negative_age["age"] = serde_json::json!(-1);
    let err = serde_json::from_value::<Customer>(negative_age).unwrap_err();
    assert!(
        err.to_string().contains("age (-1) must be within"),
        "unexpected error: {err}"
    );
}

#[test]
fn deserialized_records_are_transient() {
    let value = serde_json::json!({
        "id": 42,
        "name": "Piotr Zieliński",
        "city": "Wrocław",
        "age": 50,
        "pesel": "70101056789",
        "street": "Rynek 12",
        "appNo": "PL005"
    });

    let decoded: Customer = serde_json::from_value(value).unwrap();
    assert_eq!(decoded.id(), None);
}

fn text_field(max_chars: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<char>(), 1..=max_chars)
        .prop_map(|chars| chars.into_iter().collect::<String>())
        .prop_filter("must not be blank", |value| !value.trim().is_empty())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn valid_customers_roundtrip_through_store(
        name in text_field(NAME_MAX_CHARS),
        city in text_field(CITY_MAX_CHARS),
        age in 0..=AGE_MAX,
        pesel in text_field(PESEL_MAX_CHARS),
        street in text_field(STREET_MAX_CHARS),
        app_no in text_field(APP_NO_MAX_CHARS),
    ) {
        let customer = Customer::new(name, city, age, pesel, street, app_no).unwrap();

        let mut conn = open_db_in_memory().unwrap();
        let mut session =
            CustomerSession::new(SqliteCustomerRepository::try_new(&mut conn).unwrap());
        session.add(customer.clone());
        let stored = session.commit().unwrap().remove(0);

        let loaded = session
            .repository()
            .find_first(&CustomerFilter::Name(customer.name.clone()))
            .unwrap()
            .unwrap();
        prop_assert_eq!(loaded.id(), stored.id());
        prop_assert_eq!(&loaded.name, &customer.name);
        prop_assert_eq!(&loaded.city, &customer.city);
        prop_assert_eq!(loaded.age, customer.age);
        prop_assert_eq!(&loaded.pesel, &customer.pesel);
        prop_assert_eq!(&loaded.street, &customer.street);
        prop_assert_eq!(&loaded.app_no, &customer.app_no);
    }
}
