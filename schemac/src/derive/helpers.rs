//! The shared helper block the generated bodies call into.

use super::writer::CodeWriter;

/// Include guard around the helper block.
pub const HELPER_GUARD: &str = "SCHEMAC_IMPL_HELPERS";

const HELPERS: &str = r#"namespace rose {
template<class T>
bool schemac_equals(const T &lhs, const T &rhs) {
  return lhs == rhs;
}

template<class T, size_t N>
bool schemac_equals(const T(&lhs)[N], const T(&rhs)[N]) {
  for (size_t i = 0; i != N; ++i) {
    if (!schemac_equals(lhs[i], rhs[i])) return false;
  }
  return true;
}

template<size_t N>
bool schemac_equals(const char(&lhs)[N], const char(&rhs)[N]) {
  for (size_t i = 0; i != N; ++i) {
    if (lhs[i] != rhs[i]) return false;
    if (lhs[i] == 0) return true;
  }
  return true;
}

template<class T>
bool schemac_equals(const std::vector<T> &lhs, const std::vector<T> &rhs) {
  if (lhs.size() != rhs.size()) return false;
  for (size_t i = 0; i != lhs.size(); ++i) {
    if (!schemac_equals(lhs[i], rhs[i])) return false;
  }
  return true;
}

template<class T>
RHash schemac_hash(const T &value) {
  return hash(value);
}

template<class T, size_t N>
RHash schemac_hash(const T(&values)[N]) {
  RHash h = 0;
  for (size_t i = 0; i != N; ++i) {
    if (i != 0) h = xor64(h);
    h ^= schemac_hash(values[i]);
  }
  return h;
}

template<size_t N>
RHash schemac_hash(const char(&value)[N]) {
  return hash(value);
}

template<class T>
RHash schemac_hash(const std::vector<T> &values) {
  RHash h = 0;
  for (size_t i = 0; i != values.size(); ++i) {
    if (i != 0) h = xor64(h);
    h ^= schemac_hash(values[i]);
  }
  return h;
}
} // namespace rose"#;

/// Emit the guarded helper block.
pub fn write(w: &mut CodeWriter) {
    w.line(format!("#ifndef {HELPER_GUARD}"));
    w.line(format!("#define {HELPER_GUARD}"));
    w.blank();
    w.section("internal helper methods");
    w.blank();
    w.lines(HELPERS.lines());
    w.blank();
    w.line(format!("#endif // {HELPER_GUARD}"));
    w.blank();
}
