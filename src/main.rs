use std::sync::Arc;

use remodel::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: String,
    nickname: Option<String>,
    age: i64,
}

fn adapter() -> RecordAdapter<Person> {
    let properties = vec![
        RecordProperty::bind(
            PropertySchema::new("name", "name").constructor_parameter(),
            SHARED_STRING.clone(),
            |p: &Person| &p.name,
        ),
        RecordProperty::bind(
            PropertySchema::new("nickname", "nickname")
                .nullable()
                .defaulted()
                .constructor_parameter(),
            Arc::new(NullSafe::new(StringAdapter)),
            |p: &Person| &p.nickname,
        ),
        RecordProperty::bind(
            PropertySchema::new("age", "age")
                .defaulted()
                .constructor_parameter(),
            SHARED_I64.clone(),
            |p: &Person| &p.age,
        ),
    ];
    let shape = RecordShape::new(|slots: &mut SlotTable| {
        Ok(Person {
            name: slots.take_required::<String>(0, "name")?,
            nickname: Some("none".to_owned()),
            age: 0,
        })
    })
    .with_reconstruct(|person: Person, slots: &mut SlotTable| {
        let nickname = slots.take::<Option<String>>(1, "nickname")?;
        let age = slots.take::<i64>(2, "age")?;
        Ok(Person {
            name: person.name,
            nickname: nickname.unwrap_or(person.nickname),
            age: age.unwrap_or(person.age),
        })
    });
    match RecordAdapter::new("Person", properties, shape) {
        Ok(adapter) => adapter,
        Err(err) => panic!("schema construction failed: {}", err),
    }
}

fn check(adapter: &RecordAdapter<Person>, tokens: Vec<Token>, expected: &Person) {
    let decoded = match adapter.decode_tokens(tokens) {
        Ok(person) => person,
        Err(err) => panic!("decode failed: {}", err),
    };
    assert_eq!(&decoded, expected);
    let reencoded = match adapter.encode_to_tokens(&decoded) {
        Ok(tokens) => tokens,
        Err(err) => panic!("encode failed: {}", err),
    };
    match adapter.decode_tokens(reencoded) {
        Ok(round) => assert_eq!(round, decoded),
        Err(err) => panic!("round-trip decode failed: {}", err),
    }
}

fn main() {
    let adapter = adapter();
    check(
        &adapter,
        vec![
            Token::BeginRecord,
            Token::key("name"),
            Token::str("Ann"),
            Token::EndRecord,
        ],
        &Person {
            name: "Ann".to_owned(),
            nickname: Some("none".to_owned()),
            age: 0,
        },
    );
    check(
        &adapter,
        vec![
            Token::BeginRecord,
            Token::key("nickname"),
            Token::Null,
            Token::key("name"),
            Token::str("Bea"),
            Token::key("age"),
            Token::Int(41),
            Token::EndRecord,
        ],
        &Person {
            name: "Bea".to_owned(),
            nickname: None,
            age: 41,
        },
    );
    println!("all checks passed");
}
