use vouch::{checks, Model, Object, Specification, Validator, Value};

struct Person {
    name: String,
    age: i64,
    email: Option<String>,
}

impl Model for Person {
    fn to_value(&self) -> Value {
        Object::new()
            .set("name", self.name.as_str())
            .set("age", self.age)
            .set("email", self.email.clone())
            .into()
    }
}

fn main() {
    // Define the specification
    let validator = Validator::builder(Specification::build("Person", |s| {
        s.member("name", |m| m.required().check(checks::not_empty()))
            .member("age", |m| m.check(checks::between(0_i64, 150_i64)))
            .member("email", |m| m.required().check(checks::min_length(3)))
    }))
    .build()
    .expect("failed to compile specification");

    println!("{validator}");

    let person = Person {
        name: String::new(),
        age: 200,
        email: None,
    };

    // Quick check, then the detailed report
    println!("valid: {}", validator.is_valid_model(&person));

    let result = validator.validate_model(&person, false);
    for (path, messages) in result.messages(validator.settings(), "English") {
        for message in messages {
            println!("  {path}: {message}");
        }
    }

    let first = validator.validate_model(&person, true);
    println!("fail-fast: {first}");
}
