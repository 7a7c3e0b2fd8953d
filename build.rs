fn main() {
    // ESP-IDF link arguments; host builds (tests, fuzzing) skip this.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
