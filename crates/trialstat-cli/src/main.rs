mod command;
mod schema;
mod util;
mod workbook;

fn main() -> anyhow::Result<()> {
    command::run()
}
