use std::io::{self, Write};

use anyhow::Context;

use passgen::password_generation::class_counts;
use passgen::{CharacterClass, ClassRequirement, Requirements};

use crate::ProgError;

#[derive(clap::Args)]
pub(crate) struct GenerateArgs {
    /// Password length.
    #[arg(short, long, default_value_t = 16)]
    length: usize,
    /// How many passwords to generate.
    #[arg(short, long, default_value_t = 1)]
    count: usize,
    /// Leave out uppercase letters.
    #[arg(long)]
    no_upper: bool,
    /// Leave out lowercase letters.
    #[arg(long)]
    no_lower: bool,
    /// Leave out digits.
    #[arg(long)]
    no_digits: bool,
    /// Leave out symbols.
    #[arg(long)]
    no_symbols: bool,
    /// Minimum number of uppercase letters.
    #[arg(long, default_value_t = 1)]
    min_upper: usize,
    /// Minimum number of lowercase letters.
    #[arg(long, default_value_t = 1)]
    min_lower: usize,
    /// Minimum number of digits.
    #[arg(long, default_value_t = 1)]
    min_digits: usize,
    /// Minimum number of symbols.
    #[arg(long, default_value_t = 1)]
    min_symbols: usize,
    /// Copy the password to the clipboard instead of printing it.
    #[arg(long)]
    copy: bool,
    /// Print how many characters of each class ended up in each password to stderr.
    #[arg(long)]
    summary: bool,
}

impl GenerateArgs {
    fn requirements(&self) -> Requirements {
        let mut requirements = Requirements::all_classes(0);
        for (class, excluded, minimum) in [
            (CharacterClass::Upper, self.no_upper, self.min_upper),
            (CharacterClass::Lower, self.no_lower, self.min_lower),
            (CharacterClass::Digit, self.no_digits, self.min_digits),
            (CharacterClass::Symbol, self.no_symbols, self.min_symbols),
        ] {
            *requirements.class_mut(class) = ClassRequirement {
                include: !excluded,
                minimum,
            };
        }
        requirements
    }
}

pub(crate) fn generate(args: GenerateArgs) -> Result<(), ProgError> {
    if args.copy && args.count != 1 {
        return Err(ProgError::CopyNeedsSinglePassword);
    }
    let requirements = args.requirements();
    let mut rng = rand::rngs::OsRng;

    let mut stdout = io::stdout().lock();
    for _ in 0..args.count {
        let password = passgen::generate_password(&mut rng, args.length, &requirements)?;
        if args.summary {
            print_summary(password.as_str(), &requirements)?;
        }
        if args.copy {
            crate::clipboard::send_to_clipboard(password.as_str().as_bytes())?;
            eprintln!("Copied to the clipboard.");
        } else {
            writeln!(stdout, "{}", password.as_str()).context("failed to write password")?;
        }
    }
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}

fn print_summary(password: &str, requirements: &Requirements) -> anyhow::Result<()> {
    struct ClassRow {
        cells: [String; 4],
    }

    impl crate::table::TableDisplay for ClassRow {
        fn columns() -> usize {
            4
        }

        fn column_name(column_index: usize) -> &'static str {
            match column_index {
                0 => "Class",
                1 => "Included",
                2 => "Minimum",
                3 => "Count",
                _ => panic!(),
            }
        }

        fn item(&self, column_index: usize) -> &str {
            &self.cells[column_index]
        }
    }

    let counts = class_counts(password);
    let rows = CharacterClass::ALL
        .into_iter()
        .zip(counts)
        .map(|(class, count)| {
            let req = requirements.class(class);
            ClassRow {
                cells: [
                    class.name().to_owned(),
                    (if req.include { "yes" } else { "no" }).to_owned(),
                    req.effective_minimum().to_string(),
                    count.to_string(),
                ],
            }
        })
        .collect::<Vec<_>>();
    crate::table::display_table(&rows, io::stderr().lock()).context("failed to output table")?;
    Ok(())
}
