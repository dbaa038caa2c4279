use anyhow::{Context, Result};
use clap::Parser as _;
use cutexpr::{Parser, Record, RecordSchema, Value};
use serde_json::json;

/// Compile a cut or variable expression and evaluate it against events
#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// expression to compile, e.g. 'met>200&&njets>=6'
    expression: String,

    /// event as a JSON object of column name to number or array of numbers;
    /// may be given several times
    #[clap(short, long)]
    event: Vec<String>,

    /// print the tokens of the expression instead of evaluating it
    #[clap(long)]
    tokens: bool,

    /// emit results as JSON
    #[clap(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();

    let events = args
        .event
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            serde_json::from_str::<Record>(raw).with_context(|| format!("event {} is not valid", i))
        })
        .collect::<Result<Vec<_>>>()?;
    let schema = RecordSchema::from_records(&events);
    let mut parser = Parser::new(&args.expression, &schema);

    if args.tokens {
        for token in parser.tokenize() {
            println!("{:<16} {}", format!("{:?}", token.kind()), token.text());
        }
        return Ok(());
    }

    let expr = match parser.resolve() {
        Ok(expr) => expr,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(2);
        }
    };
    log::info!("compiled \"{}\" ({})", expr.name(), expr.shape());

    let values = events
        .iter()
        .enumerate()
        .map(|(i, event)| {
            expr.eval(event)
                .with_context(|| format!("evaluating \"{}\" on event {}", expr.name(), i))
        })
        .collect::<Result<Vec<Value>>>()?;

    if args.json {
        let output = json!({
            "name": expr.name(),
            "plain_name": expr.plain_name(),
            "shape": expr.shape().to_string(),
            "values": values,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} ({}, {})", expr.name(), expr.shape(), expr.plain_name());
        for (i, value) in values.iter().enumerate() {
            let passes = if value.passes() { "pass" } else { "fail" };
            match value {
                Value::Scalar(x) => println!("event {}: {} [{}]", i, x, passes),
                Value::Vector(v) => println!("event {}: {:?} [{}]", i, v, passes),
            }
        }
    }
    Ok(())
}
