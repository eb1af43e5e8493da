//! The embedded runtime header.
//!
//! Emitted C++ compiles against this fixed header; the driver writes it
//! next to the generated translation unit. It provides `Option`, `Result`,
//! `Vec`, `HashMap`, the scope guard behind `defer`, and the print/format,
//! string, math, file, path, time, and assertion helpers the builtin
//! dispatch table targets.

/// File name the driver writes the header under.
pub const RUNTIME_HEADER_NAME: &str = "mana_runtime.h";

/// Full header content.
pub const RUNTIME_HEADER: &str = r#"#pragma once
#include <algorithm>
#include <array>
#include <cctype>
#include <chrono>
#include <cstdint>
#include <cstdio>
#include <cstdlib>
#include <filesystem>
#include <fstream>
#include <iostream>
#include <random>
#include <sstream>
#include <stdexcept>
#include <string>
#include <thread>
#include <tuple>
#include <unordered_map>
#include <utility>
#include <vector>

namespace mana {

    // ---- scope guard (defer) ------------------------------------------

    template <typename F>
    struct Defer {
        F fn;
        explicit Defer(F f) : fn(std::move(f)) {}
        ~Defer() { fn(); }
        Defer(const Defer&) = delete;
        Defer& operator=(const Defer&) = delete;
    };

    template <typename F>
    Defer<F> defer(F f) { return Defer<F>(std::move(f)); }

    // ---- Option<T> ----------------------------------------------------

    struct None_t {};
    inline constexpr None_t None{};

    template <typename T>
    class Option {
        bool has_value_;
        alignas(T) unsigned char storage_[sizeof(T)];

        T* ptr() { return reinterpret_cast<T*>(storage_); }
        const T* ptr() const { return reinterpret_cast<const T*>(storage_); }

    public:
        Option() : has_value_(false) {}
        Option(None_t) : has_value_(false) {}
        Option(T value) : has_value_(true) { new (storage_) T(std::move(value)); }
        Option(const Option& other) : has_value_(other.has_value_) {
            if (has_value_) new (storage_) T(*other.ptr());
        }
        Option(Option&& other) noexcept : has_value_(other.has_value_) {
            if (has_value_) { new (storage_) T(std::move(*other.ptr())); other.has_value_ = false; }
        }
        ~Option() { if (has_value_) ptr()->~T(); }

        Option& operator=(const Option& other) {
            if (this != &other) {
                if (has_value_) ptr()->~T();
                has_value_ = other.has_value_;
                if (has_value_) new (storage_) T(*other.ptr());
            }
            return *this;
        }
        Option& operator=(Option&& other) noexcept {
            if (this != &other) {
                if (has_value_) ptr()->~T();
                has_value_ = other.has_value_;
                if (has_value_) { new (storage_) T(std::move(*other.ptr())); other.has_value_ = false; }
            }
            return *this;
        }

        bool is_some() const { return has_value_; }
        bool is_none() const { return !has_value_; }
        explicit operator bool() const { return has_value_; }

        T& unwrap() {
            if (!has_value_) throw std::runtime_error("unwrap called on None");
            return *ptr();
        }
        const T& unwrap() const {
            if (!has_value_) throw std::runtime_error("unwrap called on None");
            return *ptr();
        }
        T unwrap_or(T default_val) const {
            return has_value_ ? *ptr() : default_val;
        }
        template <typename F>
        T unwrap_or_else(F fallback) const {
            return has_value_ ? *ptr() : fallback();
        }

        // ? operator support
        bool __is_err() const { return !has_value_; }
        T __unwrap_ok() { return std::move(*ptr()); }
        None_t __unwrap_err() { return None; }
    };

    template <typename T>
    struct SomeWrapper {
        T value;
        explicit SomeWrapper(T v) : value(std::move(v)) {}
        operator Option<T>() const { return Option<T>(value); }
    };

    template <typename T>
    SomeWrapper<T> Some(T value) { return SomeWrapper<T>(std::move(value)); }

    template <typename T>
    Option<T> make_none() { return Option<T>(); }

    // ---- Result<T, E> -------------------------------------------------

    template <typename T, typename E = std::string>
    class Result {
        bool is_ok_;
        union {
            T ok_value_;
            E err_value_;
        };

        Result() {}

    public:
        Result(const Result& other) : is_ok_(other.is_ok_) {
            if (is_ok_) new (&ok_value_) T(other.ok_value_);
            else new (&err_value_) E(other.err_value_);
        }
        Result(Result&& other) noexcept : is_ok_(other.is_ok_) {
            if (is_ok_) new (&ok_value_) T(std::move(other.ok_value_));
            else new (&err_value_) E(std::move(other.err_value_));
        }
        ~Result() {
            if (is_ok_) ok_value_.~T();
            else err_value_.~E();
        }

        Result& operator=(const Result& other) {
            if (this != &other) {
                this->~Result();
                is_ok_ = other.is_ok_;
                if (is_ok_) new (&ok_value_) T(other.ok_value_);
                else new (&err_value_) E(other.err_value_);
            }
            return *this;
        }

        static Result Ok(T value) {
            Result r;
            r.is_ok_ = true;
            new (&r.ok_value_) T(std::move(value));
            return r;
        }
        static Result Err(E error) {
            Result r;
            r.is_ok_ = false;
            new (&r.err_value_) E(std::move(error));
            return r;
        }

        bool is_ok() const { return is_ok_; }
        bool is_err() const { return !is_ok_; }
        explicit operator bool() const { return is_ok_; }

        T& unwrap() {
            if (!is_ok_) throw std::runtime_error("unwrap called on Err");
            return ok_value_;
        }
        const T& unwrap() const {
            if (!is_ok_) throw std::runtime_error("unwrap called on Err");
            return ok_value_;
        }
        T unwrap_or(T default_val) const {
            return is_ok_ ? ok_value_ : default_val;
        }
        template <typename F>
        T unwrap_or_else(F fallback) const {
            return is_ok_ ? ok_value_ : fallback();
        }
        E& unwrap_err() {
            if (is_ok_) throw std::runtime_error("unwrap_err called on Ok");
            return err_value_;
        }

        // ? operator support
        bool __is_err() const { return !is_ok_; }
        T __unwrap_ok() { return std::move(ok_value_); }
        E __unwrap_err() { return std::move(err_value_); }
    };

    template <typename T>
    struct OkWrapper {
        T value;
        explicit OkWrapper(T v) : value(std::move(v)) {}
        template <typename E>
        operator Result<T, E>() const { return Result<T, E>::Ok(value); }
    };

    template <typename E>
    struct ErrWrapper {
        E value;
        explicit ErrWrapper(E v) : value(std::move(v)) {}
        template <typename T>
        operator Result<T, E>() const { return Result<T, E>::Err(value); }
    };

    template <>
    struct ErrWrapper<const char*> {
        const char* value;
        explicit ErrWrapper(const char* v) : value(v) {}
        template <typename T>
        operator Result<T, std::string>() const { return Result<T, std::string>::Err(std::string(value)); }
    };

    template <typename T>
    OkWrapper<T> Ok(T value) { return OkWrapper<T>(std::move(value)); }

    template <typename E>
    ErrWrapper<E> Err(E error) { return ErrWrapper<E>(std::move(error)); }

    // ---- Vec<T> -------------------------------------------------------

    // The defaulted element type backs `Vec::new()` in untyped bindings.
    template <typename T = int64_t>
    class Vec {
        std::vector<T> data_;
    public:
        Vec() = default;
        Vec(std::initializer_list<T> init) : data_(init) {}
        Vec(size_t count, const T& value) : data_(count, value) {}

        void push(T value) { data_.push_back(std::move(value)); }
        Option<T> pop() {
            if (data_.empty()) return Option<T>();
            T val = std::move(data_.back());
            data_.pop_back();
            return Option<T>(std::move(val));
        }

        T& operator[](size_t index) { return data_[index]; }
        const T& operator[](size_t index) const { return data_[index]; }

        T& at(size_t index) {
            if (index >= data_.size()) throw std::runtime_error("index out of bounds");
            return data_[index];
        }
        const T& at(size_t index) const {
            if (index >= data_.size()) throw std::runtime_error("index out of bounds");
            return data_[index];
        }

        size_t len() const { return data_.size(); }
        bool is_empty() const { return data_.empty(); }
        void clear() { data_.clear(); }
        void reserve(size_t cap) { data_.reserve(cap); }
        bool contains(const T& value) const {
            return std::find(data_.begin(), data_.end(), value) != data_.end();
        }
        void reverse() { std::reverse(data_.begin(), data_.end()); }
        void sort() { std::sort(data_.begin(), data_.end()); }

        T* begin() { return data_.data(); }
        T* end() { return data_.data() + data_.size(); }
        const T* begin() const { return data_.data(); }
        const T* end() const { return data_.data() + data_.size(); }
    };

    // ---- HashMap<K, V> ------------------------------------------------

    template <typename K = std::string, typename V = int64_t>
    class HashMap {
        std::unordered_map<K, V> data_;
    public:
        HashMap() = default;

        void insert(K key, V value) { data_[std::move(key)] = std::move(value); }
        Option<V> get(const K& key) const {
            auto it = data_.find(key);
            if (it == data_.end()) return Option<V>();
            return Option<V>(it->second);
        }
        bool contains(const K& key) const { return data_.count(key) > 0; }
        void remove(const K& key) { data_.erase(key); }
        size_t len() const { return data_.size(); }
        bool is_empty() const { return data_.empty(); }

        auto begin() { return data_.begin(); }
        auto end() { return data_.end(); }
        auto begin() const { return data_.begin(); }
        auto end() const { return data_.end(); }
    };

    // ---- printing -----------------------------------------------------

    inline void print(int32_t v) { std::printf("%d", v); }
    inline void print(int64_t v) { std::printf("%lld", (long long)v); }
    inline void print(uint32_t v) { std::printf("%u", v); }
    inline void print(uint64_t v) { std::printf("%llu", (unsigned long long)v); }
    inline void print(size_t v) { std::printf("%zu", v); }
    inline void print(float v) { std::printf("%g", v); }
    inline void print(double v) { std::printf("%g", v); }
    inline void print(bool v) { std::printf("%s", v ? "true" : "false"); }
    inline void print(char v) { std::printf("%c", v); }
    inline void print(const char* v) { std::printf("%s", v); }
    inline void print(const std::string& v) { std::printf("%s", v.c_str()); }

    inline void println() { std::printf("\n"); }
    template <typename T>
    inline void println(const T& v) { print(v); std::printf("\n"); }

    // ---- Range --------------------------------------------------------

    template <typename T>
    struct Range {
        T start;
        T end_;
        bool inclusive;

        struct Iterator {
            T current;
            T end_;
            bool inclusive;

            Iterator(T c, T e, bool inc) : current(c), end_(e), inclusive(inc) {}

            T operator*() const { return current; }
            Iterator& operator++() { ++current; return *this; }
            bool operator!=(const Iterator& other) const {
                if (inclusive) return current <= other.end_;
                return current < other.end_;
            }
        };

        Iterator begin() const { return Iterator(start, end_, inclusive); }
        Iterator end() const { return Iterator(inclusive ? end_ + 1 : end_, end_, inclusive); }
    };

    // ---- string helpers -----------------------------------------------

    inline size_t len(const std::string& s) { return s.size(); }
    template <typename T>
    inline size_t len(const Vec<T>& v) { return v.len(); }
    inline bool is_empty(const std::string& s) { return s.empty(); }
    template <typename T>
    inline bool is_empty(const Vec<T>& v) { return v.is_empty(); }

    inline std::string to_string(int32_t v) { return std::to_string(v); }
    inline std::string to_string(int64_t v) { return std::to_string(v); }
    inline std::string to_string(uint32_t v) { return std::to_string(v); }
    inline std::string to_string(uint64_t v) { return std::to_string(v); }
    inline std::string to_string(size_t v) { return std::to_string(v); }
    inline std::string to_string(float v) {
        std::ostringstream out;
        out << v;
        return out.str();
    }
    inline std::string to_string(double v) {
        std::ostringstream out;
        out << v;
        return out.str();
    }
    inline std::string to_string(bool v) { return v ? "true" : "false"; }
    inline std::string to_string(char v) { return std::string(1, v); }
    inline std::string to_string(const char* v) { return std::string(v); }
    inline std::string to_string(const std::string& v) { return v; }

    // printf-style per-expression format specs for f-strings; an empty
    // or unusable spec falls back to to_string.
    template <typename T>
    inline std::string format_spec(const T& value, const std::string& spec) {
        if (spec.empty()) return to_string(value);
        if constexpr (std::is_arithmetic_v<T>) {
            char buffer[128];
            std::string fmt = "%" + spec;
            char kind = spec.empty() ? '\0' : spec.back();
            if (kind == 'd' || kind == 'x' || kind == 'X' || kind == 'o' || kind == 'b') {
                if (kind == 'b') {
                    // binary has no printf conversion
                    unsigned long long bits = (unsigned long long)value;
                    std::string out;
                    do { out.insert(out.begin(), char('0' + (bits & 1))); bits >>= 1; } while (bits);
                    return out;
                }
                fmt = "%" + spec.substr(0, spec.size() - 1) + "ll" + kind;
                std::snprintf(buffer, sizeof(buffer), fmt.c_str(), (long long)value);
            } else if (kind == 'f' || kind == 'e' || kind == 'g') {
                std::snprintf(buffer, sizeof(buffer), fmt.c_str(), (double)value);
            } else {
                return to_string(value);
            }
            return std::string(buffer);
        } else {
            return to_string(value);
        }
    }

    inline bool starts_with(const std::string& s, const std::string& prefix) {
        if (prefix.size() > s.size()) return false;
        return s.compare(0, prefix.size(), prefix) == 0;
    }

    inline bool ends_with(const std::string& s, const std::string& suffix) {
        if (suffix.size() > s.size()) return false;
        return s.compare(s.size() - suffix.size(), suffix.size(), suffix) == 0;
    }

    inline bool contains(const std::string& s, const std::string& sub) {
        return s.find(sub) != std::string::npos;
    }

    inline std::string trim(const std::string& s) {
        size_t start = 0;
        while (start < s.size() && std::isspace((unsigned char)s[start])) start++;
        size_t end = s.size();
        while (end > start && std::isspace((unsigned char)s[end - 1])) end--;
        return s.substr(start, end - start);
    }

    inline std::string substr(const std::string& s, size_t start, size_t count) {
        return s.substr(start, count);
    }

    inline std::string replace(const std::string& s, const std::string& old_str, const std::string& new_str) {
        std::string result = s;
        size_t pos = 0;
        while ((pos = result.find(old_str, pos)) != std::string::npos) {
            result.replace(pos, old_str.length(), new_str);
            pos += new_str.length();
        }
        return result;
    }

    inline std::string to_uppercase(const std::string& s) {
        std::string result = s;
        for (char& c : result) c = (char)std::toupper((unsigned char)c);
        return result;
    }

    inline std::string to_lowercase(const std::string& s) {
        std::string result = s;
        for (char& c : result) c = (char)std::tolower((unsigned char)c);
        return result;
    }

    inline Vec<std::string> split(const std::string& s, const std::string& delimiter) {
        Vec<std::string> result;
        if (delimiter.empty()) {
            result.push(s);
            return result;
        }
        size_t start = 0;
        size_t end = s.find(delimiter);
        while (end != std::string::npos) {
            result.push(s.substr(start, end - start));
            start = end + delimiter.length();
            end = s.find(delimiter, start);
        }
        result.push(s.substr(start));
        return result;
    }

    inline std::string join(const Vec<std::string>& vec, const std::string& delimiter) {
        std::string result;
        for (size_t i = 0; i < vec.len(); ++i) {
            if (i > 0) result += delimiter;
            result += vec[i];
        }
        return result;
    }

    inline std::string repeat(const std::string& s, size_t count) {
        std::string result;
        result.reserve(s.size() * count);
        for (size_t i = 0; i < count; ++i) result += s;
        return result;
    }

    inline std::string reverse(const std::string& s) {
        return std::string(s.rbegin(), s.rend());
    }

    template <typename... Args>
    inline std::string format(const Args&... args) {
        std::string out;
        ((out += to_string(args)), ...);
        return out;
    }

    // ---- math ---------------------------------------------------------

    template <typename T>
    inline T abs(T x) { return x < 0 ? -x : x; }

    template <typename T>
    inline T min(T a, T b) { return a < b ? a : b; }

    template <typename T>
    inline T max(T a, T b) { return a > b ? a : b; }

    template <typename T>
    inline T clamp(T x, T lo, T hi) { return x < lo ? lo : (x > hi ? hi : x); }

    // ---- parsing and console I/O --------------------------------------

    inline std::string read_line() {
        std::string line;
        std::getline(std::cin, line);
        return line;
    }

    inline Option<int32_t> parse_int(const std::string& s) {
        try {
            size_t pos;
            int32_t result = std::stoi(s, &pos);
            if (pos == s.size()) return Option<int32_t>(result);
            return Option<int32_t>();
        } catch (...) {
            return Option<int32_t>();
        }
    }

    inline Option<double> parse_float(const std::string& s) {
        try {
            size_t pos;
            double result = std::stod(s, &pos);
            if (pos == s.size()) return Option<double>(result);
            return Option<double>();
        } catch (...) {
            return Option<double>();
        }
    }

    // ---- vector helpers ------------------------------------------------

    template <typename T>
    inline Vec<T> fill_array(T value, size_t count) {
        return Vec<T>(count, value);
    }

    template <typename T>
    inline Option<T> first(const Vec<T>& v) {
        if (v.is_empty()) return Option<T>();
        return Option<T>(v[0]);
    }

    template <typename T>
    inline Option<T> last(const Vec<T>& v) {
        if (v.is_empty()) return Option<T>();
        return Option<T>(v[v.len() - 1]);
    }

    template <typename T>
    inline Vec<T> concat(const Vec<T>& a, const Vec<T>& b) {
        Vec<T> out;
        for (const auto& x : a) out.push(x);
        for (const auto& x : b) out.push(x);
        return out;
    }

    template <typename T>
    inline Vec<T> flatten(const Vec<Vec<T>>& nested) {
        Vec<T> out;
        for (const auto& inner : nested)
            for (const auto& x : inner) out.push(x);
        return out;
    }

    template <typename A, typename B>
    inline Vec<std::tuple<A, B>> zip(const Vec<A>& a, const Vec<B>& b) {
        Vec<std::tuple<A, B>> out;
        size_t n = a.len() < b.len() ? a.len() : b.len();
        for (size_t i = 0; i < n; ++i) out.push(std::make_tuple(a[i], b[i]));
        return out;
    }

    template <typename A, typename B>
    inline std::tuple<Vec<A>, Vec<B>> unzip(const Vec<std::tuple<A, B>>& pairs) {
        Vec<A> firsts;
        Vec<B> seconds;
        for (const auto& p : pairs) {
            firsts.push(std::get<0>(p));
            seconds.push(std::get<1>(p));
        }
        return std::make_tuple(firsts, seconds);
    }

    template <typename T>
    inline void vec_sort(Vec<T>& v) { v.sort(); }

    template <typename T>
    inline void vec_reverse(Vec<T>& v) { v.reverse(); }

    template <typename T>
    inline bool vec_contains(const Vec<T>& v, const T& value) { return v.contains(value); }

    template <typename T>
    inline Vec<T> slice(const Vec<T>& v, int64_t start, int64_t end) {
        Vec<T> out;
        int64_t n = (int64_t)v.len();
        if (end < 0 || end > n) end = n;
        for (int64_t i = start; i < end; ++i) out.push(v[(size_t)i]);
        return out;
    }

    template <typename T>
    inline Vec<T> slice_inclusive(const Vec<T>& v, int64_t start, int64_t end) {
        return slice(v, start, end < 0 ? end : end + 1);
    }

    inline std::string slice(const std::string& s, int64_t start, int64_t end) {
        int64_t n = (int64_t)s.size();
        if (end < 0 || end > n) end = n;
        if (start < 0) start = 0;
        if (start >= end) return "";
        return s.substr((size_t)start, (size_t)(end - start));
    }

    inline std::string slice_inclusive(const std::string& s, int64_t start, int64_t end) {
        return slice(s, start, end < 0 ? end : end + 1);
    }

    // ---- files and paths ----------------------------------------------

    inline Result<std::string, std::string> read_file(const std::string& path) {
        std::ifstream in(path, std::ios::binary);
        if (!in) return Result<std::string, std::string>::Err("cannot open file: " + path);
        std::ostringstream ss;
        ss << in.rdbuf();
        return Result<std::string, std::string>::Ok(ss.str());
    }

    inline Result<bool, std::string> write_file(const std::string& path, const std::string& content) {
        std::ofstream out(path, std::ios::binary);
        if (!out) return Result<bool, std::string>::Err("cannot write file: " + path);
        out << content;
        return Result<bool, std::string>::Ok(true);
    }

    inline Result<bool, std::string> append_file(const std::string& path, const std::string& content) {
        std::ofstream out(path, std::ios::binary | std::ios::app);
        if (!out) return Result<bool, std::string>::Err("cannot append file: " + path);
        out << content;
        return Result<bool, std::string>::Ok(true);
    }

    inline bool file_exists(const std::string& path) {
        return std::filesystem::exists(path);
    }

    inline Result<bool, std::string> delete_file(const std::string& path) {
        std::error_code ec;
        if (!std::filesystem::remove(path, ec) || ec)
            return Result<bool, std::string>::Err("cannot delete file: " + path);
        return Result<bool, std::string>::Ok(true);
    }

    inline Result<Vec<std::string>, std::string> read_lines(const std::string& path) {
        std::ifstream in(path);
        if (!in) return Result<Vec<std::string>, std::string>::Err("cannot open file: " + path);
        Vec<std::string> lines;
        std::string line;
        while (std::getline(in, line)) lines.push(line);
        return Result<Vec<std::string>, std::string>::Ok(lines);
    }

    inline std::string path_join(const std::string& a, const std::string& b) {
        return (std::filesystem::path(a) / b).string();
    }

    inline std::string path_parent(const std::string& p) {
        return std::filesystem::path(p).parent_path().string();
    }

    inline std::string path_filename(const std::string& p) {
        return std::filesystem::path(p).filename().string();
    }

    inline std::string path_extension(const std::string& p) {
        return std::filesystem::path(p).extension().string();
    }

    inline bool is_directory(const std::string& p) {
        return std::filesystem::is_directory(p);
    }

    inline std::string cwd() {
        return std::filesystem::current_path().string();
    }

    inline Option<std::string> env_get(const std::string& name) {
        const char* value = std::getenv(name.c_str());
        if (!value) return Option<std::string>();
        return Option<std::string>(std::string(value));
    }

    // ---- time and random ----------------------------------------------

    inline int64_t time_now_ms() {
        return std::chrono::duration_cast<std::chrono::milliseconds>(
            std::chrono::system_clock::now().time_since_epoch()).count();
    }

    inline int64_t time_now_secs() {
        return std::chrono::duration_cast<std::chrono::seconds>(
            std::chrono::system_clock::now().time_since_epoch()).count();
    }

    inline void sleep_ms(int64_t ms) {
        std::this_thread::sleep_for(std::chrono::milliseconds(ms));
    }

    inline int64_t random_int(int64_t lo, int64_t hi) {
        static std::mt19937_64 rng(std::random_device{}());
        std::uniform_int_distribution<int64_t> dist(lo, hi);
        return dist(rng);
    }

    // ---- assertions ---------------------------------------------------

    inline void assert_true(bool condition, const char* msg = "assertion failed") {
        if (!condition) throw std::runtime_error(msg);
    }

    inline void assert_false(bool condition, const char* msg = "assertion failed: expected false") {
        if (condition) throw std::runtime_error(msg);
    }

    inline void assert_msg(bool condition, const std::string& msg) {
        if (!condition) throw std::runtime_error(msg);
    }

    template <typename A, typename B>
    inline void assert_eq(const A& a, const B& b) {
        if (!(a == b)) throw std::runtime_error("assertion failed: values not equal");
    }

    template <typename A, typename B>
    inline void assert_ne(const A& a, const B& b) {
        if (a == b) throw std::runtime_error("assertion failed: values equal");
    }

    template <typename T>
    inline void assert_some(const Option<T>& o) {
        if (o.is_none()) throw std::runtime_error("assertion failed: expected Some");
    }

    template <typename T>
    inline void assert_none(const Option<T>& o) {
        if (o.is_some()) throw std::runtime_error("assertion failed: expected None");
    }

    template <typename T, typename E>
    inline void assert_ok(const Result<T, E>& r) {
        if (r.is_err()) throw std::runtime_error("assertion failed: expected Ok");
    }

    template <typename T, typename E>
    inline void assert_err(const Result<T, E>& r) {
        if (r.is_ok()) throw std::runtime_error("assertion failed: expected Err");
    }

    inline void assert_contains(const std::string& haystack, const std::string& needle) {
        if (!contains(haystack, needle))
            throw std::runtime_error("assertion failed: substring not found");
    }

    inline void assert_str_eq(const std::string& a, const std::string& b) {
        if (a != b) throw std::runtime_error("assertion failed: strings differ");
    }

    template <typename T>
    inline void assert_empty(const T& v) {
        if (!v.is_empty()) throw std::runtime_error("assertion failed: expected empty");
    }

    template <typename T>
    inline void assert_len(const T& v, size_t expected) {
        if (v.len() != expected) throw std::runtime_error("assertion failed: wrong length");
    }

    template <typename A, typename B>
    inline void assert_gt(const A& a, const B& b) {
        if (!(a > b)) throw std::runtime_error("assertion failed: not greater");
    }

    template <typename A, typename B>
    inline void assert_lt(const A& a, const B& b) {
        if (!(a < b)) throw std::runtime_error("assertion failed: not less");
    }

    template <typename A, typename B>
    inline void assert_ge(const A& a, const B& b) {
        if (!(a >= b)) throw std::runtime_error("assertion failed: not greater-or-equal");
    }

    template <typename A, typename B>
    inline void assert_le(const A& a, const B& b) {
        if (!(a <= b)) throw std::runtime_error("assertion failed: not less-or-equal");
    }

    inline void assert_approx(double a, double b, double eps = 1e-9) {
        double diff = a > b ? a - b : b - a;
        if (diff > eps) throw std::runtime_error("assertion failed: values not approximately equal");
    }

} // namespace mana
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_provides_core_types() {
        assert!(RUNTIME_HEADER.contains("class Option"));
        assert!(RUNTIME_HEADER.contains("class Result"));
        assert!(RUNTIME_HEADER.contains("class Vec"));
        assert!(RUNTIME_HEADER.contains("class HashMap"));
        assert!(RUNTIME_HEADER.contains("struct Defer"));
    }

    #[test]
    fn test_runtime_provides_single_accessor_coalesce() {
        assert!(RUNTIME_HEADER.contains("unwrap_or_else"));
    }

    #[test]
    fn test_runtime_provides_format_helpers() {
        assert!(RUNTIME_HEADER.contains("format_spec"));
        assert!(RUNTIME_HEADER.contains("std::string format("));
    }

    #[test]
    fn test_runtime_is_stable() {
        // The header is fixed content; two reads are identical by
        // construction, and it must end inside the mana namespace close.
        assert!(RUNTIME_HEADER.trim_end().ends_with("} // namespace mana"));
    }
}
