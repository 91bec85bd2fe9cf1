fn main() {
    cinder::run_cli();
}
