fn main() {
    modlink::cmd::run();
}
