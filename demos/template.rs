use vouch::{checks, Check, Specification, Validator, Value};

fn main() {
    let validator = Validator::builder(Specification::build("Order", |s| {
        s.member("id", |m| m.required())
            .member("lines", |m| {
                m.check(checks::min_items(1))
                    .each(|e| e.nested("Line"))
            })
            .when(
                |v| v.member("express") == Some(&Value::Bool(true)),
                |w| w.member("phone", |m| m.required().check(checks::min_length(6))),
            )
            .check(
                Check::new("NoDiscountOnExpress", "Express orders cannot be discounted", |v| {
                    !(v.member("express") == Some(&Value::Bool(true)) && v.member("discount").is_some())
                })
                .at("discount"),
            )
    }))
    .register(Specification::build("Line", |s| {
        s.member("sku", |m| m.required().check(checks::length_between(3, 12)))
            .member("quantity", |m| m.required().check(checks::gt(0_i64)))
    }))
    .build()
    .expect("failed to compile specification");

    // Every message the order validator can ever produce, without an instance.
    let template = validator.template();
    let settings = validator.settings();
    for (path, shapes) in template.iter() {
        let path = path.to_string();
        for shape in shapes {
            let text = settings.translate(settings.default_translation(), shape.message());
            println!("{path:<20} {:<22} {text}", shape.code());
        }
    }
    println!("codes: {:?}", template.codes());
}
