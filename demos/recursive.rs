use tracing_subscriber::EnvFilter;
use vouch::{checks, Object, Settings, Specification, Validator, Value};

fn category(title: &str, children: Vec<Value>) -> Value {
    Object::new()
        .set("title", title)
        .set("children", children)
        .into()
}

fn main() {
    // Set RUST_LOG=vouch=trace to see back-references and depth-cap truncation.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let validator = Validator::builder(Specification::build("Category", |s| {
        s.member("title", |m| m.required().check(checks::max_length(12)))
            .member("children", |m| {
                m.check(checks::max_items(3))
                    .each(|e| e.required().nested("Category"))
            })
    }))
    .settings(Settings::new().with_max_depth(2))
    .build()
    .expect("failed to compile specification");

    println!("{}", validator.plan());
    println!("recursive: {:?}", validator.plan().recursive_specs());

    let tree = category(
        "root",
        vec![
            category("books", vec![category("a title that is far too long", vec![])]),
            Value::Null,
            category(
                "music",
                vec![category("jazz", vec![category("also far too long for us", vec![])])],
            ),
        ],
    );

    // The last long title sits three levels down, beyond the depth cap of 2.
    let result = validator.validate(&tree, false);
    print!("{result}");
}
