fn main() {
    pegast::cli::run();
}
