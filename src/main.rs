fn main() -> anyhow::Result<()> {
    evently_lib::run()
}
