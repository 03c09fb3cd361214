use std::{env, fs::File, process::ExitCode};

use classcheck_class_file::{descriptor, ClassFile, MemberKind, Result};

fn main() -> ExitCode {
    pretty_env_logger::init();

    let paths = env::args().skip(1).collect::<Vec<_>>();
    if paths.is_empty() {
        eprintln!("Usage: classcheck <class file>...");
        return ExitCode::from(2);
    }

    let mut failures = 0;
    for path in &paths {
        if let Err(err) = inspect(path) {
            log::error!("{}: {}", path, err);
            println!("{}: invalid ({:?}): {}", path, err.category(), err);
            failures += 1;
        }
        println!();
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn inspect(path: &str) -> Result<()> {
    let class_file = ClassFile::parse(File::open(path)?)?;
    print_summary(path, &class_file)?;

    class_file.validate()?;
    println!("{}: ok", path);
    Ok(())
}

fn print_summary(path: &str, class_file: &ClassFile) -> Result<()> {
    println!("{} (version {})", path, class_file.version);

    let kind = if class_file.is_interface() {
        "interface"
    } else {
        "class"
    };
    println!(
        "  {}",
        declaration(
            class_file.access_flags.modifiers(MemberKind::Class),
            format!("{} {}", kind, source_name(class_file.class_name()?))
        )
    );
    if let Some(super_class) = class_file.super_class()? {
        println!("    extends {}", source_name(super_class));
    }
    for interface in class_file.interface_names()? {
        println!("    implements {}", source_name(interface));
    }

    for field in &class_file.fields {
        let descriptor = class_file.field_descriptor(field)?;
        let type_name = descriptor::source_type_name(descriptor.as_bytes())
            .unwrap_or_else(|| descriptor.to_owned());
        println!(
            "    {};",
            declaration(
                field.access_flags.modifiers(MemberKind::Field),
                format!("{} {}", type_name, class_file.field_name(field)?)
            )
        );
    }

    for method in &class_file.methods {
        let descriptor = class_file.method_descriptor(method)?;
        let parameters = descriptor::parameter_count(descriptor.as_bytes())
            .map_or_else(|| "?".to_owned(), |count| count.to_string());
        println!(
            "    {}",
            declaration(
                method.access_flags.modifiers(MemberKind::Method),
                format!(
                    "{}{} ({} parameters, {} attributes)",
                    class_file.method_name(method)?,
                    descriptor,
                    parameters,
                    method.attributes.len()
                )
            )
        );
    }

    for diagnostic in &class_file.diagnostics {
        println!("  warning: {}", diagnostic);
    }

    Ok(())
}

fn declaration(modifiers: String, rest: String) -> String {
    if modifiers.is_empty() {
        rest
    } else {
        format!("{} {}", modifiers, rest)
    }
}

fn source_name(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}
