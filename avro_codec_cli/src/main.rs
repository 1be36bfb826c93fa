//! Thin command-line front-end over `avro_codec` (§6.4)
//!
//! Every subcommand shells out to the core: `create` to
//! [`avro_codec::schema_builder`], `generate` to [`generate::emit_struct`]
//! (the minimal, explicitly-not-a-real-code-generator stand-in for the
//! out-of-scope source emitter named in spec §1), `registry-get`/
//! `registry-test` to [`avro_codec::registry`]. No business logic lives
//! here; a failure anywhere below is wrapped into a [`ProgramError`] and
//! printed to stderr with exit code 1, per §7 "User-facing reporting".

mod generate;

use anyhow::Context;
use avro_codec::descriptor::TypeDescriptor;
use avro_codec::error::ProgramError;
use avro_codec::registry::{HttpSchemaRegistryClient, SchemaRegistryClient};
use avro_codec::schema::Schema;
use avro_codec::schema_builder::{build_schema_from_descriptor, SchemaBuilderConfig, TemporalBehavior};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Read as _;
use std::path::PathBuf;

/// Compiles Avro schemas against host types and talks to a schema registry
#[derive(Parser)]
#[command(name = "avro-codec", author, version, about, long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,

	/// Increase log verbosity (can be repeated: -v, -vv)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Command {
	/// Derive an Avro schema for a host type (§6.4 `create`)
	Create(CreateArgs),
	/// Emit host source for a schema (§6.4 `generate`)
	Generate(GenerateArgs),
	/// Print a schema from the registry (§6.4 `registry-get`)
	RegistryGet(RegistryLookupArgs),
	/// Confirm a host type is compatible with a registry schema (§6.4 `registry-test`)
	RegistryTest(RegistryTestArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum TemporalArg {
	#[value(name = "iso8601")]
	Iso8601,
	#[value(name = "epoch-millis")]
	EpochMillis,
	#[value(name = "epoch-micros")]
	EpochMicros,
}
impl From<TemporalArg> for TemporalBehavior {
	fn from(value: TemporalArg) -> Self {
		match value {
			TemporalArg::Iso8601 => TemporalBehavior::Iso8601,
			TemporalArg::EpochMillis => TemporalBehavior::EpochMillis,
			TemporalArg::EpochMicros => TemporalBehavior::EpochMicros,
		}
	}
}

#[derive(Args)]
struct CreateArgs {
	/// The host type to build a schema for, as a JSON-encoded `TypeDescriptor`
	/// (file path, or `-` for stdin) — the Rust-native stand-in for the
	/// "host-type locator" of §6.4, since a compiled Rust binary has no
	/// runtime reflection to locate a type by name (see DESIGN.md)
	#[arg(long = "type-descriptor")]
	type_descriptor: PathBuf,

	/// How to represent temporal host types on the wire (§4.6)
	#[arg(long, value_enum, default_value = "epoch-millis")]
	temporal: TemporalArg,

	/// Wrap every reference-typed field/element in `Union(null, T)` (§4.6)
	#[arg(long)]
	nullable_references: bool,

	/// `decimal` precision for `BigDecimal`-typed fields with no narrower
	/// attribute-supplied value
	#[arg(long, default_value_t = 29)]
	decimal_precision: usize,
	/// `decimal` scale for `BigDecimal`-typed fields with no narrower
	/// attribute-supplied value
	#[arg(long, default_value_t = 14)]
	decimal_scale: u32,
}

#[derive(Args)]
struct GenerateArgs {
	#[command(flatten)]
	source: SchemaSource,
}

#[derive(Args)]
struct RegistryLookupArgs {
	/// Base URL of the schema registry, e.g. `http://localhost:8081`
	#[arg(long)]
	registry_url: String,
	#[command(flatten)]
	target: RegistryTarget,
}

#[derive(Args)]
struct RegistryTestArgs {
	#[arg(long)]
	registry_url: String,
	#[command(flatten)]
	target: RegistryTarget,
	/// Host type to check compatibility for, same format as `create`'s
	/// `--type-descriptor`
	#[arg(long = "type-descriptor")]
	type_descriptor: PathBuf,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct RegistryTarget {
	/// Look up a schema by registry id
	#[arg(long)]
	id: Option<u32>,
	/// Look up a schema by subject (optionally `--version`, else latest)
	#[arg(long)]
	subject: Option<String>,
}

#[derive(Args)]
struct SchemaSource {
	/// Read the schema from this file (`-` for stdin); if omitted and stdin
	/// is not connected to a terminal, stdin is used — matching §6.4's
	/// "stdin if connected; else registry" precedence
	#[arg(long)]
	schema: Option<PathBuf>,
	#[arg(long)]
	registry_url: Option<String>,
	#[arg(long)]
	id: Option<u32>,
	#[arg(long)]
	subject: Option<String>,
	#[arg(long)]
	version: Option<u32>,
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbose);
	if let Err(err) = run(cli.command) {
		eprintln!("{}", err.message);
		std::process::exit(err.code);
	}
}

fn init_tracing(verbose: u8) {
	let level = match verbose {
		0 => tracing::Level::WARN,
		1 => tracing::Level::INFO,
		_ => tracing::Level::DEBUG,
	};
	tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();
}

fn run(command: Command) -> Result<(), ProgramError> {
	match command {
		Command::Create(args) => create(args),
		Command::Generate(args) => generate_cmd(args),
		Command::RegistryGet(args) => registry_get(args),
		Command::RegistryTest(args) => registry_test(args),
	}
}

fn to_program_error(e: anyhow::Error) -> ProgramError {
	ProgramError::new(e.to_string())
}

fn read_source(path: &PathBuf) -> anyhow::Result<String> {
	if path.as_os_str() == "-" {
		let mut buf = String::new();
		std::io::stdin()
			.read_to_string(&mut buf)
			.context("failed to read stdin")?;
		Ok(buf)
	} else {
		std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
	}
}

fn read_type_descriptor(path: &PathBuf) -> anyhow::Result<TypeDescriptor> {
	let text = read_source(path)?;
	serde_json::from_str(&text).context("failed to parse type descriptor JSON")
}

fn create(args: CreateArgs) -> Result<(), ProgramError> {
	(|| -> anyhow::Result<()> {
		let descriptor = read_type_descriptor(&args.type_descriptor)?;
		let config = SchemaBuilderConfig {
			temporal: args.temporal.into(),
			decimal_precision: args.decimal_precision,
			decimal_scale: args.decimal_scale,
			nullable_references: args.nullable_references,
		};
		let schema = build_schema_from_descriptor(&descriptor, &config).context("failed to build schema")?;
		println!("{}", schema.canonical_json());
		Ok(())
	})()
	.map_err(to_program_error)
}

fn resolve_schema_source(source: &SchemaSource) -> anyhow::Result<Schema> {
	// §6.4 "Schema source precedence: stdin if connected; else registry."
	let use_stdin = source.schema.is_some()
		|| (source.registry_url.is_none() && !atty_is_terminal());
	if use_stdin {
		let text = match &source.schema {
			Some(path) => read_source(path)?,
			None => read_source(&PathBuf::from("-"))?,
		};
		return text.parse::<Schema>().context("failed to parse schema JSON");
	}
	let registry_url = source
		.registry_url
		.as_ref()
		.context("no schema source: pass --schema, or --registry-url with --id/--subject")?;
	let client = HttpSchemaRegistryClient::new(registry_url.clone());
	let json = fetch_from_registry(&client, source.id, source.subject.as_deref(), source.version)?;
	json.parse::<Schema>().context("failed to parse schema JSON from registry")
}

fn fetch_from_registry(
	client: &HttpSchemaRegistryClient,
	id: Option<u32>,
	subject: Option<&str>,
	version: Option<u32>,
) -> anyhow::Result<String> {
	match (id, subject, version) {
		(Some(id), _, _) => client.get_schema_by_id(id).map_err(anyhow::Error::from),
		(None, Some(subject), Some(version)) => client
			.get_schema_by_subject_and_version(subject, version)
			.map(|(_, json)| json)
			.map_err(anyhow::Error::from),
		(None, Some(subject), None) => client
			.get_latest_schema_by_subject(subject)
			.map(|(_, json)| json)
			.map_err(anyhow::Error::from),
		(None, None, _) => anyhow::bail!("either --id or --subject is required"),
	}
}

fn atty_is_terminal() -> bool {
	// No `atty`/`is-terminal` dependency pulled in solely for this; the
	// standard library's own `IsTerminal` (stable since 1.70) is enough.
	use std::io::IsTerminal as _;
	std::io::stdin().is_terminal()
}

fn generate_cmd(args: GenerateArgs) -> Result<(), ProgramError> {
	(|| -> anyhow::Result<()> {
		let schema = resolve_schema_source(&args.source)?;
		print!("{}", generate::emit_struct(&schema));
		Ok(())
	})()
	.map_err(to_program_error)
}

fn registry_get(args: RegistryLookupArgs) -> Result<(), ProgramError> {
	(|| -> anyhow::Result<()> {
		let client = HttpSchemaRegistryClient::new(args.registry_url.clone());
		let json = fetch_from_registry(&client, args.target.id, args.target.subject.as_deref(), None)?;
		println!("{json}");
		Ok(())
	})()
	.map_err(to_program_error)
}

fn registry_test(args: RegistryTestArgs) -> Result<(), ProgramError> {
	(|| -> anyhow::Result<()> {
		let client = HttpSchemaRegistryClient::new(args.registry_url.clone());
		let json = fetch_from_registry(&client, args.target.id, args.target.subject.as_deref(), None)?;
		let schema: Schema = json.parse().context("failed to parse schema JSON from registry")?;
		let descriptor = read_type_descriptor(&args.type_descriptor)?;
		// "confirm a host type is compatible... both encode and decode can be
		// built without error" (§6.4) — since the core's build_* operations
		// are generic over a concrete serde T rather than a TypeDescriptor
		// value, compatibility here is checked the one way this CLI process
		// can check it without a compiled T in hand: re-deriving a schema
		// from the descriptor and structurally comparing its canonical form
		// against the registry schema (two schemas built for compatible
		// types canonicalize identically; see DESIGN.md Open Question).
		let derived = build_schema_from_descriptor(&descriptor, &SchemaBuilderConfig::default())
			.context("host type cannot produce any schema")?;
		if derived.canonical_json() == schema.canonical_json() {
			println!("compatible");
			Ok(())
		} else {
			anyhow::bail!(
				"host type's derived schema does not match the registry schema\nderived:  {}\nregistry: {}",
				derived.canonical_json(),
				schema.canonical_json()
			)
		}
	})()
	.map_err(to_program_error)
}
