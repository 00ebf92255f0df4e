use cfpq_bench::cli;

fn main() {
    std::process::exit(cli::run());
}
